//! Physical shop locations.

use uuid::Uuid;

/// A shop branch shown to customers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Inactive branches are hidden from listings.
    pub is_active: bool,
}

/// Active branches from `directory`, mapping directory failures to internal
/// errors.
pub async fn list_active_branches(
    directory: &dyn super::ports::BranchDirectory,
) -> Result<Vec<Branch>, super::Error> {
    directory
        .active_branches()
        .await
        .map_err(super::port_errors::map_branch_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{BranchDirectoryError, MockBranchDirectory};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn directory_failure_is_internal() {
        let mut directory = MockBranchDirectory::new();
        directory
            .expect_active_branches()
            .times(1)
            .return_once(|| Err(BranchDirectoryError::connection("refused")));

        let err = list_active_branches(&directory)
            .await
            .expect_err("failure propagates");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn branches_pass_through() {
        let branch = Branch {
            id: Uuid::nil(),
            name: "Lekki".to_owned(),
            address: "1 Admiralty Way".to_owned(),
            phone: None,
            is_active: true,
        };
        let expected = vec![branch.clone()];
        let mut directory = MockBranchDirectory::new();
        directory
            .expect_active_branches()
            .return_once(move || Ok(vec![branch]));

        assert_eq!(list_active_branches(&directory).await.expect("listed"), expected);
    }
}
