//! Agreement store - creation, lifecycle transitions, and list views.

mod create_agreement;
mod list_agreements;
mod transition_agreement;

pub use create_agreement::{CreateAgreementCommand, CreateAgreementHandler, CreateAgreementResult};
pub use list_agreements::{
    recent_success_rate, AgreementList, AgreementListItem, ListAgreementsHandler,
    ListAgreementsQuery, RECENT_CHECK_INS_LIMIT,
};
pub use transition_agreement::{
    AgreementAction, TransitionAgreementCommand, TransitionAgreementHandler,
};
