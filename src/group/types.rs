use serde::{Deserialize, Serialize};

use crate::shared::IntegerInput;

/// Request payload for creating an invitation group
#[derive(Debug, Default, Deserialize)]
pub struct CreateGroupRequest {
    pub group_name: Option<String>,
    pub group_type: Option<String>,
    pub suggested_guests: Option<IntegerInput>,
    pub contact_person: Option<String>,
    pub notes: Option<String>,
}

/// Optional filter for listing groups
#[derive(Debug, Default, Deserialize)]
pub struct GroupListQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeleteGroupResponse {
    pub success: bool,
}
