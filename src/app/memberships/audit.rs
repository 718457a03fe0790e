use sqlx::SqlitePool;

use crate::app::db;

use super::MembershipError;

/// Scan the store for project memberships that have no organization membership behind them.
///
/// Every offender is logged; the first one is returned as `InconsistentState`.
/// Nothing is repaired.
pub async fn verify_consistency(pool: &SqlitePool) -> Result<(), MembershipError> {
    let orphans = db::project_members::find_orphans(pool).await?;

    for orphan in &orphans {
        tracing::error!(
            project_id = %orphan.project_id,
            organization_id = %orphan.organization_id,
            user_id = %orphan.user_id,
            "project membership without organization membership"
        );
    }

    match orphans.into_iter().next() {
        Some(orphan) => Err(MembershipError::InconsistentState {
            project_id: orphan.project_id,
            user_id: orphan.user_id,
        }),
        None => Ok(()),
    }
}
