//! Grammar of the confirmation step: after extraction the candidate list is
//! shown to the user, who may save everything, remove entries by index, or
//! discard the batch. No other input is accepted.

const AFFIRMATIVE: &[&str] = &["save", "yes", "ok", "okay", "ja", "да"];
const CANCEL: &[&str] = &["cancel", "no", "nein", "нет"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    SaveAll,
    /// 1-based indices to drop from the candidate list.
    Remove(Vec<usize>),
    Cancel,
}

/// Parses a review command. Returns `None` for anything outside the accepted
/// token sets.
pub fn parse_command(input: &str) -> Option<ReviewCommand> {
    let normalized = input.trim().to_lowercase();

    if AFFIRMATIVE.contains(&normalized.as_str()) {
        return Some(ReviewCommand::SaveAll);
    }
    if CANCEL.contains(&normalized.as_str()) {
        return Some(ReviewCommand::Cancel);
    }

    if let Some(rest) = normalized.strip_prefix("remove") {
        let indices: Vec<usize> = rest
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        if indices.is_empty() {
            return None;
        }
        return Some(ReviewCommand::Remove(indices));
    }

    None
}

/// Applies a removal command to a candidate list. Indices are 1-based;
/// out-of-range indices are silently ignored. Removing every candidate is
/// rejected (`None`), which discards the whole batch.
pub fn apply_removals<T>(candidates: Vec<T>, indices: &[usize]) -> Option<Vec<T>> {
    let remaining: Vec<T> = candidates
        .into_iter()
        .enumerate()
        .filter(|(pos, _)| !indices.contains(&(pos + 1)))
        .map(|(_, candidate)| candidate)
        .collect();

    if remaining.is_empty() {
        None
    } else {
        Some(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_tokens_save_all() {
        assert_eq!(parse_command("save"), Some(ReviewCommand::SaveAll));
        assert_eq!(parse_command(" YES "), Some(ReviewCommand::SaveAll));
        assert_eq!(parse_command("ja"), Some(ReviewCommand::SaveAll));
    }

    #[test]
    fn cancel_tokens_discard() {
        assert_eq!(parse_command("cancel"), Some(ReviewCommand::Cancel));
        assert_eq!(parse_command("Nein"), Some(ReviewCommand::Cancel));
    }

    #[test]
    fn remove_parses_comma_and_space_separated_indices() {
        assert_eq!(
            parse_command("remove 1,3, 5"),
            Some(ReviewCommand::Remove(vec![1, 3, 5]))
        );
        assert_eq!(
            parse_command("remove 2 4"),
            Some(ReviewCommand::Remove(vec![2, 4]))
        );
    }

    #[test]
    fn remove_without_indices_is_rejected() {
        assert_eq!(parse_command("remove"), None);
        assert_eq!(parse_command("remove a,b"), None);
    }

    #[test]
    fn free_text_is_not_accepted() {
        assert_eq!(parse_command("please store these"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn removals_ignore_out_of_range_indices() {
        let kept = apply_removals(vec!["a", "b", "c"], &[2, 99]).unwrap();
        assert_eq!(kept, vec!["a", "c"]);
    }

    #[test]
    fn removing_everything_rejects_the_batch() {
        assert_eq!(apply_removals(vec!["a", "b"], &[1, 2]), None);
    }
}
