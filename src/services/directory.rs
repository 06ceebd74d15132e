use sqlx::PgPool;

use super::StoreError;
use crate::database::rows::CompanyRow;
use crate::database::Database;

/// Company/process reference data, narrowed to the caller's claim set.
pub struct DirectoryService {
    pool: PgPool,
}

impl DirectoryService {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            pool: Database::pool()?,
        })
    }

    /// Companies visible to a caller with the given authorized ids. An empty
    /// claim list means no restriction.
    pub async fn companies_for(&self, company_ids: &[i32]) -> Result<Vec<CompanyRow>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.get_companies()")
            .fetch_all(&self.pool)
            .await?;

        let all = rows
            .iter()
            .map(CompanyRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(filter_companies(all, company_ids))
    }
}

/// Pure claim filter: keep companies whose id is in the allowed set; an
/// empty set means return everything.
pub fn filter_companies(all: Vec<CompanyRow>, allowed: &[i32]) -> Vec<CompanyRow> {
    if allowed.is_empty() {
        return all;
    }
    all.into_iter()
        .filter(|company| allowed.contains(&company.company_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn companies() -> Vec<CompanyRow> {
        [(1, "Acme"), (3, "Globex"), (7, "Initech"), (9, "Umbra")]
            .into_iter()
            .map(|(company_id, name)| CompanyRow {
                company_id,
                company_name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn restricts_to_claimed_ids() {
        let visible = filter_companies(companies(), &[3, 7]);
        let ids: Vec<i32> = visible.iter().map(|c| c.company_id).collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn empty_claim_set_sees_everything() {
        assert_eq!(filter_companies(companies(), &[]).len(), 4);
    }

    #[test]
    fn unknown_ids_yield_nothing() {
        assert!(filter_companies(companies(), &[42]).is_empty());
    }
}
