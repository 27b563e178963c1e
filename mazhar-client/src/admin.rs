use crate::{api::AdminComment, forest, Snapshot};

/// Every comment of every article as a flat moderation list, newest first
pub fn admin_rows(snapshot: &Snapshot) -> Vec<AdminComment> {
    let mut rows = snapshot
        .articles()
        .flat_map(|(_, f)| forest::flatten(f).map(|(_, c)| c.to_admin()))
        .collect::<Vec<_>>();
    rows.sort_unstable_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    rows
}
