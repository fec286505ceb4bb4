use crate::capture::Payload;
use crate::classify::{Classifier, ClassifierError};
use crate::mood::ExpressionScores;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Returns the same scores for every payload. Useful offline and in tests.
#[derive(Clone, Debug, Default)]
pub struct FixedClassifier {
    scores: ExpressionScores,
}

impl FixedClassifier {
    pub fn new(scores: ExpressionScores) -> Self {
        Self { scores }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _payload: Payload) -> BoxFuture<'_, Result<ExpressionScores, ClassifierError>> {
        async move { Ok(self.scores.clone()) }.boxed()
    }
}
