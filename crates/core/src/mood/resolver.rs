use crate::mood::{ExpressionScores, MoodLabel, MoodResult};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("score for {category:?} is outside [0, 1]: {score}")]
    InvalidInput { category: String, score: f32 },
}

/// Collapses raw expression scores into a single mood.
///
/// The highest score wins; on a tie the category seen first wins. The
/// confidence is the winning score as given, with no validation. A NaN score
/// only wins when no real score follows it.
pub fn resolve(scores: &ExpressionScores) -> MoodResult {
    let mut winner: Option<(&str, f32)> = None;

    for (category, score) in scores.iter() {
        match winner {
            Some((_, best)) if score > best || best.is_nan() => {
                winner = Some((category, score))
            }
            Some(_) => {}
            None => winner = Some((category, score)),
        }
    }

    match winner {
        Some((category, confidence)) => {
            MoodResult::detected(MoodLabel::from_category(category), confidence)
        }
        None => MoodResult::no_signal(),
    }
}

/// Like [`resolve`], but rejects scores that are not finite values in `[0, 1]`.
pub fn resolve_validated(scores: &ExpressionScores) -> Result<MoodResult, ResolveError> {
    if let Some((category, score)) = scores
        .iter()
        .find(|(_, score)| !(0.0..=1.0).contains(score))
    {
        return Err(ResolveError::InvalidInput {
            category: category.to_owned(),
            score,
        });
    }
    Ok(resolve(scores))
}
