//! MCP tools for shared checklists.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{acting_member, invalid, json_result, map_db_error, scoped_list};
use crate::db::{Database, SharedList, SharedListItem, SharedListRepository};
use crate::mcp::FamilyScope;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListSharedListsParams {
    #[schemars(description = "Member asking; their family's lists are returned")]
    pub member_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateSharedListParams {
    #[schemars(description = "Member creating the list; it is shared with their family")]
    pub member_id: String,
    #[schemars(description = "List name, e.g. 'Courses'")]
    pub name: String,
    pub description: Option<String>,
    #[schemars(description = "Hex colour (default: #3b82f6)")]
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SharedListIdParams {
    #[schemars(description = "Shared list ID")]
    pub list_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddSharedListItemsParams {
    #[schemars(description = "Shared list ID")]
    pub list_id: String,
    #[schemars(description = "One text per item; blank texts are ignored")]
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ToggleSharedListItemParams {
    #[schemars(description = "Item ID")]
    pub item_id: String,
    #[schemars(description = "Member ticking the item (optional)")]
    pub member_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteSharedListItemParams {
    #[schemars(description = "Item ID")]
    pub item_id: String,
}

pub struct SharedListTools<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for SharedListTools<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database + 'static> SharedListTools<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    async fn scoped_item(
        &self,
        scope: &FamilyScope,
        item_id: &str,
    ) -> Result<SharedListItem, McpError> {
        let item = self
            .db
            .shared_lists()
            .get_item(item_id)
            .await
            .map_err(map_db_error)?;
        scoped_list(&*self.db, scope, &item.list_id).await?;
        Ok(item)
    }

    pub async fn list_shared_lists(
        &self,
        scope: &FamilyScope,
        params: Parameters<ListSharedListsParams>,
    ) -> Result<CallToolResult, McpError> {
        let member = acting_member(&*self.db, scope, &params.0.member_id).await?;
        let lists = self
            .db
            .shared_lists()
            .list_by_family(&member.family_id)
            .await
            .map_err(map_db_error)?;

        json_result(&lists)
    }

    pub async fn create_shared_list(
        &self,
        scope: &FamilyScope,
        params: Parameters<CreateSharedListParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let member = acting_member(&*self.db, scope, &params.member_id).await?;
        let name = params.name.trim();
        if name.is_empty() {
            return Err(invalid("invalid_name", "List name must not be empty"));
        }

        let list = SharedList {
            id: String::new(),
            family_id: member.family_id,
            name: name.to_string(),
            description: params.description,
            color: params.color.unwrap_or_default(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let created = self
            .db
            .shared_lists()
            .create(&list)
            .await
            .map_err(map_db_error)?;

        json_result(&created)
    }

    pub async fn delete_shared_list(
        &self,
        scope: &FamilyScope,
        params: Parameters<SharedListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        scoped_list(&*self.db, scope, &params.0.list_id).await?;
        self.db
            .shared_lists()
            .delete(&params.0.list_id)
            .await
            .map_err(map_db_error)?;

        json_result(&json!({"deleted": params.0.list_id}))
    }

    pub async fn list_shared_list_items(
        &self,
        scope: &FamilyScope,
        params: Parameters<SharedListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let list = scoped_list(&*self.db, scope, &params.0.list_id).await?;
        let items = self
            .db
            .shared_lists()
            .list_items(&list.id)
            .await
            .map_err(map_db_error)?;

        json_result(&json!({
            "list": list,
            "items": items,
        }))
    }

    pub async fn add_shared_list_items(
        &self,
        scope: &FamilyScope,
        params: Parameters<AddSharedListItemsParams>,
    ) -> Result<CallToolResult, McpError> {
        scoped_list(&*self.db, scope, &params.0.list_id).await?;
        let items = self
            .db
            .shared_lists()
            .add_items(&params.0.list_id, &params.0.texts)
            .await
            .map_err(map_db_error)?;

        json_result(&items)
    }

    pub async fn toggle_shared_list_item(
        &self,
        scope: &FamilyScope,
        params: Parameters<ToggleSharedListItemParams>,
    ) -> Result<CallToolResult, McpError> {
        let item = self.scoped_item(scope, &params.0.item_id).await?;
        if let Some(member_id) = params.0.member_id.as_deref() {
            acting_member(&*self.db, scope, member_id).await?;
        }
        let toggled = self
            .db
            .shared_lists()
            .set_item_checked(&item.id, !item.checked, params.0.member_id.as_deref())
            .await
            .map_err(map_db_error)?;

        json_result(&toggled)
    }

    pub async fn delete_shared_list_item(
        &self,
        scope: &FamilyScope,
        params: Parameters<DeleteSharedListItemParams>,
    ) -> Result<CallToolResult, McpError> {
        self.scoped_item(scope, &params.0.item_id).await?;
        self.db
            .shared_lists()
            .delete_item(&params.0.item_id)
            .await
            .map_err(map_db_error)?;

        json_result(&json!({"deleted": params.0.item_id}))
    }
}
