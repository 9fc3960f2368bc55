//! Branch listing for the public site.

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Branch, Error, list_active_branches};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Shop branch as shown to customers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchDto {
    pub id: String,
    #[schema(example = "Yaba")]
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

impl From<Branch> for BranchDto {
    fn from(branch: Branch) -> Self {
        Self {
            id: branch.id.to_string(),
            name: branch.name,
            address: branch.address,
            phone: branch.phone,
        }
    }
}

/// Active branches ordered by name.
#[utoipa::path(
    get,
    path = "/api/branches",
    responses(
        (status = 200, description = "Active branches", body = [BranchDto]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["branches"],
    operation_id = "listBranches",
    security([])
)]
#[get("/branches")]
pub async fn list_branches(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BranchDto>>> {
    let branches = list_active_branches(state.branches.as_ref()).await?;
    Ok(web::Json(branches.into_iter().map(BranchDto::from).collect()))
}
