//! Records exchanged with the room backend.
//!
//! The backend contract drifts between revisions, so every record decodes
//! leniently: unknown fields are ignored, optional fields default, and ids
//! are accepted as numbers or strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Backend identifier, normalized to its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Unsigned(u64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Id(text),
            Raw::Integer(n) => Id(n.to_string()),
            Raw::Unsigned(n) => Id(n.to_string()),
            Raw::Float(n) => Id(n.to_string()),
        })
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A virtual room ("club").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Current number of users in the room.
    #[serde(
        default,
        rename = "size",
        alias = "occupancy",
        deserialize_with = "null_as_default"
    )]
    pub occupancy: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: u32,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "thumbnail_url", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, alias = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Room {
    /// Type label for display, falling back to the genre.
    pub fn kind(&self) -> Option<&str> {
        self.room_type.as_deref().or(self.genre.as_deref())
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.occupancy >= self.capacity
    }
}

/// Body for creating or updating a room.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<Id>,
}

/// A chat message in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Id,
    #[serde(default, alias = "room_id", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Id>,
    #[serde(alias = "user_id")]
    pub user_id: Id,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    pub content: String,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body for posting a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub user_id: String,
    pub content: String,
}

/// Public profile of a platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Id,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Body for updating a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A live stream listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: Id,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub viewers: u32,
    #[serde(default, alias = "thumbnail_url", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for creating or updating a stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStream {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Id>,
}

/// Login request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_accepts_numbers_and_strings() {
        let ids: Vec<Id> = serde_json::from_value(json!([7, "abc", 3.5])).unwrap();
        assert_eq!(ids, vec![Id::new("7"), Id::new("abc"), Id::new("3.5")]);
        assert_eq!(serde_json::to_value(Id::new("7")).unwrap(), json!("7"));
    }

    #[test]
    fn test_null_counters_decode_as_zero() {
        let rooms: Vec<Room> = serde_json::from_value(json!([
            { "id": 1, "name": "a", "capacity": null, "size": null },
            { "id": 2, "name": "b", "occupancy": null },
        ]))
        .unwrap();
        assert_eq!((rooms[0].occupancy, rooms[0].capacity), (0, 0));
        assert_eq!(rooms[1].occupancy, 0);
        assert!(!rooms[0].is_full());

        let stream: Stream =
            serde_json::from_value(json!({ "id": 1, "title": "Set", "viewers": null })).unwrap();
        assert_eq!(stream.viewers, 0);

        let message: Message = serde_json::from_value(json!({
            "id": 1, "userId": 2, "username": null, "content": "hi"
        }))
        .unwrap();
        assert_eq!(message.username, "");
    }

    #[test]
    fn test_room_decodes_web_projection() {
        let room: Room = serde_json::from_value(json!({
            "id": 3,
            "name": "Digital Disco",
            "size": 7,
            "capacity": 8,
            "type": "party",
            "thumbnail_url": "/disco.png",
            "unknown": true
        }))
        .unwrap();

        assert_eq!(room.id.as_str(), "3");
        assert_eq!(room.occupancy, 7);
        assert_eq!(room.kind(), Some("party"));
        assert_eq!(room.thumbnail.as_deref(), Some("/disco.png"));
        assert!(!room.is_full());
    }

    #[test]
    fn test_room_minimal_shape() {
        let room: Room = serde_json::from_value(json!({ "id": "r1", "name": "Lobby" })).unwrap();
        assert_eq!(room.occupancy, 0);
        assert_eq!(room.capacity, 0);
        assert!(room.kind().is_none());
        assert!(!room.is_full());
    }

    #[test]
    fn test_new_room_wire_names() {
        let body = serde_json::to_value(NewRoom {
            name: "Neon".to_string(),
            room_type: Some("music".to_string()),
            capacity: 8,
            host_id: Some(Id::new("7")),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "name": "Neon", "type": "music", "capacity": 8, "hostId": "7" })
        );
    }

    #[test]
    fn test_message_accepts_snake_case() {
        let message: Message = serde_json::from_value(json!({
            "id": 1,
            "room_id": 4,
            "user_id": 9,
            "username": "dj",
            "content": "hi"
        }))
        .unwrap();
        assert_eq!(message.room_id, Some(Id::new("4")));
        assert_eq!(message.user_id, Id::new("9"));
    }

    #[test]
    fn test_outgoing_message_is_camel_case() {
        let body = serde_json::to_value(OutgoingMessage {
            user_id: "7".to_string(),
            content: "hello".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({ "userId": "7", "content": "hello" }));
    }
}
