use chrono::Utc;
use futures::future::join_all;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    models::{GeneratedTokenModel, NewGeneratedToken, NewRsvp, RsvpModel},
    repository::RsvpRepository,
    types::{CheckInResponse, RsvpWithCheckIns, SubmitRsvpRequest},
};
use crate::group::repository::GroupRepository;
use crate::qr::archive::{build_qr_archive, QrEntry};
use crate::shared::{non_blank, optional_integer, AppError};

pub const MIN_GUESTS: i32 = 1;
pub const MAX_GUESTS: i32 = 10;

/// Characters left intact in the check-in URL, same set as `encodeURIComponent`
const TOKEN_QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A stored RSVP together with its tokens and the QR archive for them
#[derive(Debug)]
pub struct SubmittedRsvp {
    pub rsvp: RsvpModel,
    pub tokens: Vec<GeneratedTokenModel>,
    pub file_name: String,
    pub archive: Vec<u8>,
}

/// Service for the guest-facing RSVP flow and the admin RSVP listing
pub struct RsvpService {
    rsvps: Arc<dyn RsvpRepository + Send + Sync>,
    groups: Arc<dyn GroupRepository + Send + Sync>,
    base_origin: String,
}

impl RsvpService {
    pub fn new(
        rsvps: Arc<dyn RsvpRepository + Send + Sync>,
        groups: Arc<dyn GroupRepository + Send + Sync>,
        base_origin: impl Into<String>,
    ) -> Self {
        Self {
            rsvps,
            groups,
            base_origin: base_origin.into(),
        }
    }

    /// Validates the guest count, stores the RSVP, mints one token per guest
    /// and renders their QR codes into a ZIP.
    ///
    /// The RSVP insert and the token insert are separate statements. If the
    /// token insert fails the RSVP row stays behind.
    #[instrument(skip(self, request), fields(group_token = ?request.group_token))]
    pub async fn submit(&self, request: SubmitRsvpRequest) -> Result<SubmittedRsvp, AppError> {
        let name = non_blank(request.name);
        let token_base = non_blank(request.id);

        let mut guests = optional_integer(request.guests, invalid_guest_count)?;
        if let Some(requested) = guests {
            validate_guest_count(requested)?;
        }

        let mut group_id = None;

        if let Some(group_token) = non_blank(request.group_token) {
            match self.groups.find_by_token(&group_token).await? {
                Some(group) => {
                    let requested = *guests.get_or_insert(group.suggested_guests);
                    if requested > group.suggested_guests {
                        return Err(AppError::QuotaExceeded(format!(
                            "El numero maximo de invitados para este grupo es {}",
                            group.suggested_guests
                        )));
                    }
                    group_id = Some(group.id);
                }
                None => warn!(group_token = %group_token, "Group not found, continuing without group"),
            }
        }

        let guests = guests.unwrap_or(MIN_GUESTS);
        validate_guest_count(guests)?;
        let file_name = archive_file_name(name.as_deref());

        let rsvp = self
            .rsvps
            .create_rsvp(&NewRsvp {
                name: name.clone(),
                attendance: non_blank(request.attendance),
                song_request: non_blank(request.song_request),
                message: non_blank(request.message),
                token_base: token_base.clone(),
                guests,
                group_id,
            })
            .await?;

        let base = token_base.unwrap_or_else(|| format!("guest-{}", rsvp.id));
        let display_name = name.as_deref().unwrap_or("guest");

        let mut new_tokens = Vec::with_capacity(guests as usize);
        let mut entries = Vec::with_capacity(guests as usize);
        for i in 1..=guests {
            let token = format!("{base}-{i}");
            let label = format!("{display_name}-{i}");
            entries.push(QrEntry {
                label: label.clone(),
                url: self.check_in_url(&token),
            });
            new_tokens.push(NewGeneratedToken {
                token,
                rsvp_id: rsvp.id,
                label,
            });
        }

        let tokens = self.rsvps.insert_tokens(&new_tokens).await.map_err(|e| {
            error!(rsvp_id = rsvp.id, error = %e, "Token insert failed after RSVP was stored");
            e
        })?;

        let archive = build_qr_archive(&entries)?;

        info!(rsvp_id = rsvp.id, guests, ?group_id, "RSVP submitted");
        Ok(SubmittedRsvp {
            file_name,
            rsvp,
            tokens,
            archive,
        })
    }

    /// Marks a generated token as checked in
    #[instrument(skip(self))]
    pub async fn check_in(&self, token: &str) -> Result<CheckInResponse, AppError> {
        let record = self
            .rsvps
            .check_in(token, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Token not found".to_string()))?;

        info!(
            label = %record.label,
            already_checked_in = record.already_checked_in,
            "Guest checked in"
        );

        Ok(CheckInResponse {
            ok: true,
            message: format!("{} checked in!", record.label),
            label: record.label,
            already_checked_in: record.already_checked_in,
            checked_in_at: record.checked_in_at,
        })
    }

    /// Every RSVP annotated with its checked-in token count. A failed count
    /// is reported as 0.
    #[instrument(skip(self))]
    pub async fn list_with_check_ins(&self) -> Result<Vec<RsvpWithCheckIns>, AppError> {
        let rsvps = self.rsvps.list_rsvps().await?;

        let counted = join_all(rsvps.into_iter().map(|rsvp| async move {
            let checked_in_count = match self.rsvps.count_checked_in(rsvp.id).await {
                Ok(count) => count,
                Err(e) => {
                    warn!(rsvp_id = rsvp.id, error = %e, "Failed to count check-ins");
                    0
                }
            };
            RsvpWithCheckIns {
                rsvp,
                checked_in_count,
            }
        }))
        .await;

        Ok(counted)
    }

    fn check_in_url(&self, token: &str) -> String {
        format!(
            "{}/checkin?token={}",
            self.base_origin,
            utf8_percent_encode(token, TOKEN_QUERY)
        )
    }
}

fn invalid_guest_count() -> AppError {
    AppError::InvalidInput("Numero de invitados invalido (1-10)".to_string())
}

pub fn validate_guest_count(guests: i32) -> Result<(), AppError> {
    if (MIN_GUESTS..=MAX_GUESTS).contains(&guests) {
        Ok(())
    } else {
        Err(invalid_guest_count())
    }
}

/// `{name}_qrcodes.zip` with whitespace runs collapsed to `_`. Quotes and
/// control characters are dropped so the name always fits a header value.
pub fn archive_file_name(name: Option<&str>) -> String {
    let stem = name
        .map(|n| {
            n.split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .chars()
                .filter(|c| *c != '"' && !c.is_control())
                .collect::<String>()
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "rsvp".to_string());

    format!("{stem}_qrcodes.zip")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{models::NewInvitationGroup, repository::InMemoryGroupRepository};
    use crate::rsvp::repository::InMemoryRsvpRepository;
    use crate::shared::IntegerInput;
    use rstest::rstest;

    const ORIGIN: &str = "http://localhost:5173";

    struct Fixture {
        service: RsvpService,
        rsvps: Arc<InMemoryRsvpRepository>,
        groups: Arc<InMemoryGroupRepository>,
    }

    fn fixture() -> Fixture {
        let rsvps = Arc::new(InMemoryRsvpRepository::new());
        let groups = Arc::new(InMemoryGroupRepository::new());
        Fixture {
            service: RsvpService::new(rsvps.clone(), groups.clone(), ORIGIN),
            rsvps,
            groups,
        }
    }

    async fn add_group(groups: &InMemoryGroupRepository, token: &str, quota: i32) {
        groups
            .create_group(&NewInvitationGroup {
                token: token.to_string(),
                group_name: "Familia".to_string(),
                group_type: "family".to_string(),
                suggested_guests: quota,
                contact_person: None,
                notes: None,
            })
            .await
            .unwrap();
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(10, true)]
    #[case(11, false)]
    #[case(-3, false)]
    fn test_validate_guest_count(#[case] guests: i32, #[case] valid: bool) {
        assert_eq!(validate_guest_count(guests).is_ok(), valid);
    }

    #[rstest]
    #[case(Some("Ana Maria  Lopez"), "Ana_Maria_Lopez_qrcodes.zip")]
    #[case(Some("Ana"), "Ana_qrcodes.zip")]
    #[case(Some("Ana \"La\" Lopez"), "Ana_La_Lopez_qrcodes.zip")]
    #[case(Some("Ana\u{1}"), "Ana_qrcodes.zip")]
    #[case(Some("\u{7f}\u{1b}"), "rsvp_qrcodes.zip")]
    #[case(None, "rsvp_qrcodes.zip")]
    fn test_archive_file_name(#[case] name: Option<&str>, #[case] expected: &str) {
        assert_eq!(archive_file_name(name), expected);
    }

    #[tokio::test]
    async fn test_submit_mints_one_token_per_guest() {
        let f = fixture();
        let submitted = f
            .service
            .submit(SubmitRsvpRequest {
                id: Some("abc".to_string()),
                name: Some("Ana".to_string()),
                guests: Some(IntegerInput::Number(3)),
                ..Default::default()
            })
            .await
            .unwrap();

        let tokens: Vec<String> = f
            .rsvps
            .tokens_for(submitted.rsvp.id)
            .await
            .into_iter()
            .map(|t| t.token)
            .collect();
        assert_eq!(tokens, vec!["abc-1", "abc-2", "abc-3"]);
        assert_eq!(submitted.tokens[0].label, "Ana-1");
        assert_eq!(submitted.file_name, "Ana_qrcodes.zip");
        assert!(!submitted.archive.is_empty());
    }

    #[tokio::test]
    async fn test_submit_without_id_uses_guest_base() {
        let f = fixture();
        let submitted = f
            .service
            .submit(SubmitRsvpRequest::default())
            .await
            .unwrap();

        assert_eq!(submitted.rsvp.guests, 1);
        assert_eq!(
            submitted.tokens[0].token,
            format!("guest-{}-1", submitted.rsvp.id)
        );
        assert_eq!(submitted.tokens[0].label, "guest-1");
        assert_eq!(submitted.file_name, "rsvp_qrcodes.zip");
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_guest_count() {
        let f = fixture();
        let result = f
            .service
            .submit(SubmitRsvpRequest {
                guests: Some(IntegerInput::Number(11)),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(f.rsvps.rsvp_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_enforces_group_quota() {
        let f = fixture();
        add_group(&f.groups, "FAM00001", 2).await;

        let result = f
            .service
            .submit(SubmitRsvpRequest {
                guests: Some(IntegerInput::Number(3)),
                group_token: Some("FAM00001".to_string()),
                ..Default::default()
            })
            .await;
        match result {
            Err(AppError::QuotaExceeded(msg)) => {
                assert_eq!(msg, "El numero maximo de invitados para este grupo es 2")
            }
            other => panic!("expected quota error, got {other:?}"),
        }
        assert_eq!(f.rsvps.rsvp_count().await, 0);

        let accepted = f
            .service
            .submit(SubmitRsvpRequest {
                guests: Some(IntegerInput::Number(2)),
                group_token: Some("FAM00001".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(accepted.rsvp.group_id, Some(1));
    }

    #[tokio::test]
    async fn test_submit_defaults_guests_to_group_quota() {
        let f = fixture();
        add_group(&f.groups, "FAM00002", 4).await;

        let submitted = f
            .service
            .submit(SubmitRsvpRequest {
                group_token: Some("FAM00002".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(submitted.rsvp.guests, 4);
        assert_eq!(submitted.tokens.len(), 4);
    }

    #[tokio::test]
    async fn test_submit_unknown_group_continues_without_group() {
        let f = fixture();
        let submitted = f
            .service
            .submit(SubmitRsvpRequest {
                guests: Some(IntegerInput::Number(5)),
                group_token: Some("MISSING1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(submitted.rsvp.group_id, None);
        assert_eq!(submitted.tokens.len(), 5);
    }

    #[test]
    fn test_check_in_url_encodes_token() {
        let f = fixture();
        assert_eq!(
            f.service.check_in_url("José Luis-1"),
            "http://localhost:5173/checkin?token=Jos%C3%A9%20Luis-1"
        );
        assert_eq!(
            f.service.check_in_url("a/b&c-1"),
            "http://localhost:5173/checkin?token=a%2Fb%26c-1"
        );
    }

    #[tokio::test]
    async fn test_check_in_flow() {
        let f = fixture();
        f.service
            .submit(SubmitRsvpRequest {
                id: Some("abc".to_string()),
                name: Some("Ana".to_string()),
                guests: Some(IntegerInput::Number(2)),
                ..Default::default()
            })
            .await
            .unwrap();

        let first = f.service.check_in("abc-2").await.unwrap();
        assert_eq!(first.message, "Ana-2 checked in!");
        assert!(!first.already_checked_in);

        let second = f.service.check_in("abc-2").await.unwrap();
        assert!(second.ok);
        assert!(second.already_checked_in);
        assert_eq!(second.checked_in_at, first.checked_in_at);

        let missing = f.service.check_in("abc-9").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let listed = f.service.list_with_check_ins().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].checked_in_count, 1);
    }
}
