use sqlx::PgPool;

use super::StoreError;
use crate::database::rows::{LoginRow, UserRow};
use crate::database::Database;

/// User lookup and credential checks.
pub struct UserService {
    pool: PgPool,
}

/// Result of a successful credential check: the user's fields plus every
/// company mapping the store returned for them.
#[derive(Debug, Clone)]
pub struct LoginProfile {
    pub user: LoginRow,
    pub company_ids: Vec<i32>,
    pub company_names: Vec<String>,
}

impl LoginProfile {
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.user.first_name.as_deref().unwrap_or_default(),
            self.user.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

impl UserService {
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            pool: Database::pool()?,
        })
    }

    /// Check credentials; `None` means the store found no match. The routine
    /// returns one row per mapped company, user fields repeated.
    pub async fn check_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<LoginProfile>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.check_login($1, $2)")
            .bind(email)
            .bind(password)
            .fetch_all(&self.pool)
            .await?;

        let rows = rows
            .iter()
            .map(LoginRow::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(collect_profile(rows))
    }

    pub async fn list(&self) -> Result<Vec<UserRow>, StoreError> {
        let rows = sqlx::query("SELECT * FROM orbis.get_all_users()")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| UserRow::from_row(row).map_err(StoreError::from))
            .collect()
    }
}

/// Fold login rows into one profile: user fields from the first row, company
/// ids and names accumulated across rows in first-seen order, deduplicated.
pub fn collect_profile(rows: Vec<LoginRow>) -> Option<LoginProfile> {
    let user = rows.first()?.clone();

    let mut company_ids = Vec::new();
    let mut company_names = Vec::new();
    for row in &rows {
        if let Some(id) = row.company_id {
            if !company_ids.contains(&id) {
                company_ids.push(id);
                company_names.push(row.company_name.clone().unwrap_or_default());
            }
        }
    }

    Some(LoginProfile {
        user,
        company_ids,
        company_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_row(company: Option<(i32, &str)>) -> LoginRow {
        LoginRow {
            user_id: 10,
            first_name: Some("Alice".to_string()),
            last_name: Some("Smith".to_string()),
            email: "alice@example.com".to_string(),
            role_id: 2,
            role_name: Some("Manager".to_string()),
            company_id: company.map(|(id, _)| id),
            company_name: company.map(|(_, name)| name.to_string()),
        }
    }

    #[test]
    fn no_rows_means_no_profile() {
        assert!(collect_profile(Vec::new()).is_none());
    }

    #[test]
    fn accumulates_companies_in_first_seen_order() {
        let profile = collect_profile(vec![
            login_row(Some((3, "Globex"))),
            login_row(Some((7, "Initech"))),
            login_row(Some((3, "Globex"))),
        ])
        .unwrap();

        assert_eq!(profile.company_ids, vec![3, 7]);
        assert_eq!(profile.company_names, vec!["Globex", "Initech"]);
    }

    #[test]
    fn user_without_companies_has_empty_lists() {
        let profile = collect_profile(vec![login_row(None)]).unwrap();
        assert!(profile.company_ids.is_empty());
        assert_eq!(profile.display_name(), "Alice Smith");
    }

    #[test]
    fn display_name_handles_missing_parts() {
        let mut row = login_row(None);
        row.last_name = None;
        let profile = collect_profile(vec![row]).unwrap();
        assert_eq!(profile.display_name(), "Alice");
    }
}
