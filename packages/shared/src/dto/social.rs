//! Friend, private chat and group shapes of the wider REST/WebSocket contract.
//!
//! These records carry no behavior in this workspace; they pin the JSON shape
//! (camelCase keys) other services exchange with the chat frontend.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Friend request lifecycle shares the friendship states
pub type RequestStatus = FriendStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: i64,
    pub user_id: String,
    pub friend_id: String,
    pub friend_name: String,
    pub status: FriendStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: i64,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatGroup {
    pub id: i64,
    pub group_name: String,
    pub description: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub member_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    pub id: i64,
    pub group_id: i64,
    pub sender_id: String,
    pub content: String,
    pub timestamp: i64,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: i64,
    pub group_id: i64,
    pub user_id: String,
    pub role: GroupRole,
    pub joined_at: i64,
    pub status: MemberStatus,
}

/// Envelope of REST responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub group_name: String,
    pub description: String,
    pub owner_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestPayload {
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    pub user_id: String,
}

/// Generic typed event pushed over a WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketEvent<T = serde_json::Value> {
    pub r#type: String,
    pub data: T,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusEvent {
    pub user_id: String,
    pub status: OnlineStatus,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_group_uses_camel_case_and_omits_missing_avatar() {
        // テスト項目: ChatGroup は camelCase で JSON 化され、avatarUrl が無ければ省略される
        // given (前提条件):
        let group = ChatGroup {
            id: 1,
            group_name: "rustaceans".to_string(),
            description: "crabs only".to_string(),
            owner_id: "alice".to_string(),
            avatar_url: None,
            member_ids: vec!["alice".to_string(), "bob".to_string()],
            created_at: 10,
            updated_at: 20,
        };

        // when (操作):
        let json = serde_json::to_value(&group).unwrap();

        // then (期待する結果):
        assert_eq!(json["groupName"], "rustaceans");
        assert_eq!(json["memberIds"][1], "bob");
        assert!(json.get("avatarUrl").is_none());
    }

    #[test]
    fn test_api_response_wraps_typed_data() {
        // テスト項目: ApiResponse がジェネリックなデータを包んでパースできる
        // given (前提条件):
        let json = r#"{"code":0,"message":"ok","data":{"userId":"bob","status":"online","timestamp":3}}"#;

        // when (操作):
        let response: ApiResponse<UserStatusEvent> = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(response.code, 0);
        assert_eq!(response.data.user_id, "bob");
        assert_eq!(response.data.status, OnlineStatus::Online);
    }

    #[test]
    fn test_websocket_event_defaults_to_untyped_data() {
        // テスト項目: WebSocketEvent は型指定なしで任意の data を保持できる
        // given (前提条件):
        let json = r#"{"type":"group.created","data":{"id":7},"timestamp":9}"#;

        // when (操作):
        let event: WebSocketEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(event.r#type, "group.created");
        assert_eq!(event.data["id"], 7);
    }
}
