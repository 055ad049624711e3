//! Input validation
//!
//! Pure checks shared by every write path. Handlers call these before
//! touching a repository so limits live in exactly one place.

use thiserror::Error;

use crate::models::{
    CreateCommentInput, CreateCommunityPostInput, CreatePostInput, ProfileInput,
    MAX_COMMENT_CONTENT_CHARS, MAX_INTERESTS, MAX_POST_CONTENT_CHARS,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("at most {max} interests can be selected")]
    TooManyInterests { max: usize },
    #[error("invalid email address")]
    InvalidEmail,
}

/// Minimal shape check, the mail provider does the real verification
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Empty { field: "email" });
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_post_input(input: &CreatePostInput) -> Result<(), ValidationError> {
    require_non_empty("title", &input.title)?;
    require_non_empty("content", &input.content)?;
    require_non_empty("author", &input.author)
}

pub fn validate_community_post(input: &CreateCommunityPostInput) -> Result<(), ValidationError> {
    require_non_empty("content", &input.content)?;
    require_max_chars("content", &input.content, MAX_POST_CONTENT_CHARS)
}

pub fn validate_comment(input: &CreateCommentInput) -> Result<(), ValidationError> {
    require_non_empty("content", &input.content)?;
    require_max_chars("content", &input.content, MAX_COMMENT_CONTENT_CHARS)
}

pub fn validate_profile(input: &ProfileInput) -> Result<(), ValidationError> {
    if input.interests.len() > MAX_INTERESTS {
        return Err(ValidationError::TooManyInterests { max: MAX_INTERESTS });
    }
    Ok(())
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

/// Limits count characters, not bytes
fn require_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommunityCategory, Interest};

    fn community_input(content: String) -> CreateCommunityPostInput {
        CreateCommunityPostInput {
            category: CommunityCategory::Sleep,
            content,
            anonymous: false,
            allow_private_messages: true,
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("anna@example.com").is_ok());
        assert!(validate_email(" anna@example.com ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("anna").is_err());
        assert!(validate_email("anna@").is_err());
        assert!(validate_email("anna@localhost").is_err());
        assert!(validate_email("an na@example.com").is_err());
    }

    #[test]
    fn test_post_content_limit_is_inclusive() {
        let at_limit = community_input("å".repeat(MAX_POST_CONTENT_CHARS));
        assert!(validate_community_post(&at_limit).is_ok());

        let over = community_input("å".repeat(MAX_POST_CONTENT_CHARS + 1));
        assert_eq!(
            validate_community_post(&over),
            Err(ValidationError::TooLong {
                field: "content",
                max: MAX_POST_CONTENT_CHARS
            })
        );
    }

    #[test]
    fn test_comment_limit() {
        let input = CreateCommentInput {
            post_id: 1,
            content: "x".repeat(MAX_COMMENT_CONTENT_CHARS + 1),
            anonymous: false,
        };
        assert!(validate_comment(&input).is_err());
    }

    #[test]
    fn test_blank_content_rejected() {
        let input = community_input("   ".to_string());
        assert_eq!(
            validate_community_post(&input),
            Err(ValidationError::Empty { field: "content" })
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            #[test]
            fn prop_strings_without_at_never_validate(s in "[a-z0-9 .]{0,40}") {
                prop_assert!(validate_email(&s).is_err());
            }

            #[test]
            fn prop_comments_within_limit_accepted(len in 1usize..=MAX_COMMENT_CONTENT_CHARS) {
                let input = CreateCommentInput {
                    post_id: 1,
                    content: "x".repeat(len),
                    anonymous: false,
                };
                prop_assert!(validate_comment(&input).is_ok());
            }
        }
    }

    #[test]
    fn test_interest_cap() {
        let mut input = ProfileInput {
            interests: vec![
                Interest::Breastfeeding,
                Interest::SleepRoutines,
            ],
            ..Default::default()
        };
        assert!(validate_profile(&input).is_ok());

        input.interests.push(Interest::OwnRecovery);
        assert_eq!(
            validate_profile(&input),
            Err(ValidationError::TooManyInterests { max: MAX_INTERESTS })
        );
    }
}
