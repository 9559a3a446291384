//! ListAgreementsHandler - enriched agreement list views for a couple.

use std::sync::Arc;

use crate::domain::agreement::{Agreement, AgreementError, CheckIn};
use crate::domain::foundation::{AgreementStatus, CoupleId, Timestamp, UserId};
use crate::ports::{AgreementRepository, CheckInRepository, CoupleRepository};

/// How many recent check-ins each list item carries.
pub const RECENT_CHECK_INS_LIMIT: u32 = 5;

/// Query for a couple's agreements.
#[derive(Debug, Clone)]
pub struct ListAgreementsQuery {
    pub couple_id: CoupleId,
    pub user_id: UserId,
    pub status: Option<AgreementStatus>,
}

/// One agreement enriched for list display.
#[derive(Debug, Clone)]
pub struct AgreementListItem {
    pub agreement: Agreement,
    /// The newest check-ins, most recent first, capped at
    /// [`RECENT_CHECK_INS_LIMIT`].
    pub recent_check_ins: Vec<CheckIn>,
    /// Percentage of the returned check-ins that were good or partial,
    /// rounded. `None` when there are no check-ins yet.
    pub recent_success_rate: Option<u32>,
    pub is_check_in_due: bool,
}

/// A couple's agreement list.
#[derive(Debug, Clone)]
pub struct AgreementList {
    pub items: Vec<AgreementListItem>,
}

/// Success rate over a window of check-ins, as a rounded percentage.
pub fn recent_success_rate(check_ins: &[CheckIn]) -> Option<u32> {
    if check_ins.is_empty() {
        return None;
    }
    let successful = check_ins.iter().filter(|c| c.status.is_successful()).count();
    Some(((successful as f64 / check_ins.len() as f64) * 100.0).round() as u32)
}

/// Handler for listing agreements.
pub struct ListAgreementsHandler {
    couples: Arc<dyn CoupleRepository>,
    agreements: Arc<dyn AgreementRepository>,
    check_ins: Arc<dyn CheckInRepository>,
}

impl ListAgreementsHandler {
    pub fn new(
        couples: Arc<dyn CoupleRepository>,
        agreements: Arc<dyn AgreementRepository>,
        check_ins: Arc<dyn CheckInRepository>,
    ) -> Self {
        Self {
            couples,
            agreements,
            check_ins,
        }
    }

    pub async fn handle(&self, query: ListAgreementsQuery) -> Result<AgreementList, AgreementError> {
        let couple = self
            .couples
            .find_by_id(&query.couple_id)
            .await?
            .ok_or(AgreementError::CoupleNotFound(query.couple_id))?;
        couple.authorize_member(&query.user_id)?;

        // Dissolved agreements never appear in list views, even when
        // asked for by name.
        if query.status == Some(AgreementStatus::DissolvedWithCouple) {
            return Ok(AgreementList { items: vec![] });
        }

        let agreements = self
            .agreements
            .list_by_couple(&query.couple_id, query.status)
            .await?;

        let now = Timestamp::now();
        let mut items = Vec::with_capacity(agreements.len());
        for agreement in agreements {
            let recent_check_ins = self
                .check_ins
                .list_recent(agreement.id(), RECENT_CHECK_INS_LIMIT)
                .await?;
            let recent_success_rate = recent_success_rate(&recent_check_ins);
            let is_check_in_due = agreement.is_check_in_due(&now);
            items.push(AgreementListItem {
                agreement,
                recent_check_ins,
                recent_success_rate,
                is_check_in_due,
            });
        }

        Ok(AgreementList { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAgreementRepository, InMemoryCheckInRepository, InMemoryCoupleRepository,
    };
    use crate::domain::agreement::NewAgreement;
    use crate::domain::couple::Couple;
    use crate::domain::foundation::{AgreementId, AgreementKind, CheckInId, CheckInStatus};
    use crate::ports::CheckInRepository as _;

    struct Fixture {
        agreements: Arc<InMemoryAgreementRepository>,
        check_ins: Arc<InMemoryCheckInRepository>,
        handler: ListAgreementsHandler,
        couple: Couple,
        user_a: UserId,
    }

    fn fixture() -> Fixture {
        let couples = Arc::new(InMemoryCoupleRepository::new());
        let agreements = Arc::new(InMemoryAgreementRepository::new());
        let check_ins = Arc::new(InMemoryCheckInRepository::new());

        let user_a = UserId::new();
        let user_b = UserId::new();
        let couple = Couple::form(CoupleId::new(), user_a, user_b).unwrap();
        couples.insert(couple.clone());

        let handler =
            ListAgreementsHandler::new(couples, agreements.clone(), check_ins.clone());

        Fixture {
            agreements,
            check_ins,
            handler,
            couple,
            user_a,
        }
    }

    fn seed_agreement(f: &Fixture) -> Agreement {
        let agreement = Agreement::propose(
            AgreementId::new(),
            NewAgreement {
                couple_id: *f.couple.id(),
                created_by: f.user_a,
                title: "Weekly budget review".to_string(),
                description: None,
                underlying_need: None,
                kind: AgreementKind::Commitment,
                themes: vec![],
                responsible_user_id: Some(f.user_a),
                check_in_frequency_days: 7,
                created_in_session_id: None,
            },
            &f.couple,
        )
        .unwrap();
        f.agreements.insert(agreement.clone());
        agreement
    }

    async fn seed_check_in(f: &Fixture, agreement: &Agreement, status: CheckInStatus) {
        let check_in = CheckIn::new(
            CheckInId::new(),
            *agreement.id(),
            f.user_a,
            status,
            None,
            None,
            Timestamp::now(),
        )
        .unwrap();
        f.check_ins.save(&check_in).await.unwrap();
    }

    #[test]
    fn success_rate_rounds_and_handles_empty() {
        assert_eq!(recent_success_rate(&[]), None);
    }

    #[tokio::test]
    async fn list_enriches_with_recent_check_ins_and_rate() {
        let f = fixture();
        let agreement = seed_agreement(&f);
        seed_check_in(&f, &agreement, CheckInStatus::Good).await;
        seed_check_in(&f, &agreement, CheckInStatus::Partial).await;
        seed_check_in(&f, &agreement, CheckInStatus::Difficult).await;

        let list = f
            .handler
            .handle(ListAgreementsQuery {
                couple_id: *f.couple.id(),
                user_id: f.user_a,
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(list.items.len(), 1);
        let item = &list.items[0];
        assert_eq!(item.recent_check_ins.len(), 3);
        // 2 of 3 successful -> 67%.
        assert_eq!(item.recent_success_rate, Some(67));
        // Created with a 7-day cadence; nothing due yet.
        assert!(!item.is_check_in_due);
    }

    #[tokio::test]
    async fn rate_is_null_without_check_ins() {
        let f = fixture();
        seed_agreement(&f);

        let list = f
            .handler
            .handle(ListAgreementsQuery {
                couple_id: *f.couple.id(),
                user_id: f.user_a,
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(list.items[0].recent_success_rate, None);
    }

    #[tokio::test]
    async fn at_most_five_recent_check_ins_are_returned() {
        let f = fixture();
        let agreement = seed_agreement(&f);
        for _ in 0..8 {
            seed_check_in(&f, &agreement, CheckInStatus::Good).await;
        }

        let list = f
            .handler
            .handle(ListAgreementsQuery {
                couple_id: *f.couple.id(),
                user_id: f.user_a,
                status: None,
            })
            .await
            .unwrap();
        assert_eq!(
            list.items[0].recent_check_ins.len(),
            RECENT_CHECK_INS_LIMIT as usize
        );
    }

    #[tokio::test]
    async fn dissolved_agreements_are_never_listed() {
        let f = fixture();
        let mut agreement = seed_agreement(&f);
        agreement.dissolve_with_couple().unwrap();
        f.agreements.insert(agreement);

        let all = f
            .handler
            .handle(ListAgreementsQuery {
                couple_id: *f.couple.id(),
                user_id: f.user_a,
                status: None,
            })
            .await
            .unwrap();
        assert!(all.items.is_empty());

        // Even an explicit filter comes back empty.
        let filtered = f
            .handler
            .handle(ListAgreementsQuery {
                couple_id: *f.couple.id(),
                user_id: f.user_a,
                status: Some(AgreementStatus::DissolvedWithCouple),
            })
            .await
            .unwrap();
        assert!(filtered.items.is_empty());
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let f = fixture();
        let result = f
            .handler
            .handle(ListAgreementsQuery {
                couple_id: *f.couple.id(),
                user_id: UserId::new(),
                status: None,
            })
            .await;
        assert_eq!(result.unwrap_err(), AgreementError::Forbidden);
    }
}
