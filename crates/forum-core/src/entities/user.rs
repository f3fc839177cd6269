//! User entity - the durable account record

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::{is_reserved, ExtensionFields};
use crate::error::DomainError;
use crate::value_objects::Uid;

/// Hash fields stored on `user:<uid>` that never leave the store layer
const PRIVATE_FIELDS: &[&str] = &["password", "email:confirmed"];

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Set at creation
    #[default]
    Online,
    Offline,
    Away,
    /// Do not disturb
    Dnd,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Away => write!(f, "away"),
            Self::Dnd => write!(f, "dnd"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "away" => Ok(Self::Away),
            "dnd" => Ok(Self::Dnd),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// A persisted user account
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub uid: Uid,
    pub username: String,
    pub userslug: String,
    pub fullname: String,
    pub location: String,
    pub birthday: String,
    pub website: String,
    pub email: Option<String>,
    pub signature: String,
    pub joindate: DateTime<Utc>,
    pub picture: String,
    pub gravatarpicture: String,
    pub uploadedpicture: String,
    pub profileviews: u64,
    pub reputation: i64,
    pub postcount: u64,
    pub lastposttime: i64,
    pub banned: bool,
    pub status: UserStatus,
    /// Allow-listed custom fields contributed by the caller or by extensions
    pub extra: ExtensionFields,
}

impl UserRecord {
    /// Create a fresh record with every counter at zero and status `online`
    pub fn new(
        uid: Uid,
        username: String,
        userslug: String,
        email: Option<String>,
        picture: String,
        joindate: DateTime<Utc>,
    ) -> Self {
        Self {
            uid,
            username,
            userslug,
            fullname: String::new(),
            location: String::new(),
            birthday: String::new(),
            website: String::new(),
            email,
            signature: String::new(),
            joindate,
            gravatarpicture: picture.clone(),
            picture,
            uploadedpicture: String::new(),
            profileviews: 0,
            reputation: 0,
            postcount: 0,
            lastposttime: 0,
            banned: false,
            status: UserStatus::Online,
            extra: ExtensionFields::new(),
        }
    }

    /// Store key of this record
    pub fn key(&self) -> String {
        Self::key_for(self.uid)
    }

    /// Store key of the record for `uid`
    pub fn key_for(uid: Uid) -> String {
        format!("user:{uid}")
    }

    /// Join timestamp in milliseconds, the score used by the join-date ranking
    pub fn joindate_millis(&self) -> i64 {
        self.joindate.timestamp_millis()
    }

    /// Apply an extension field, routing profile keys to their typed slot.
    ///
    /// Returns `false` for system-owned keys, which are never applied.
    pub fn apply_field(&mut self, key: &str, value: &str) -> bool {
        match key {
            "fullname" => self.fullname = value.to_string(),
            "location" => self.location = value.to_string(),
            "birthday" => self.birthday = value.to_string(),
            "website" => self.website = value.to_string(),
            "signature" => self.signature = value.to_string(),
            k if is_reserved(k) || PRIVATE_FIELDS.contains(&k) => return false,
            _ => self.extra.set(key, value),
        }
        true
    }

    /// Flatten the record into hash fields
    pub fn to_hash(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = vec![
            ("uid".into(), self.uid.to_string()),
            ("username".into(), self.username.clone()),
            ("userslug".into(), self.userslug.clone()),
            ("fullname".into(), self.fullname.clone()),
            ("location".into(), self.location.clone()),
            ("birthday".into(), self.birthday.clone()),
            ("website".into(), self.website.clone()),
            ("email".into(), self.email.clone().unwrap_or_default()),
            ("signature".into(), self.signature.clone()),
            ("joindate".into(), self.joindate_millis().to_string()),
            ("picture".into(), self.picture.clone()),
            ("gravatarpicture".into(), self.gravatarpicture.clone()),
            ("uploadedpicture".into(), self.uploadedpicture.clone()),
            ("profileviews".into(), self.profileviews.to_string()),
            ("reputation".into(), self.reputation.to_string()),
            ("postcount".into(), self.postcount.to_string()),
            ("lastposttime".into(), self.lastposttime.to_string()),
            ("banned".into(), u8::from(self.banned).to_string()),
            ("status".into(), self.status.to_string()),
        ];
        fields.extend(
            self.extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        fields
    }

    /// Rebuild a record from the hash stored at `user:<uid>`
    pub fn from_hash(mut hash: HashMap<String, String>) -> Result<Self, DomainError> {
        let corrupt = |field: &str| DomainError::InternalError(format!("corrupt user field '{field}'"));

        let uid = hash
            .get("uid")
            .and_then(|v| Uid::parse(v).ok())
            .ok_or_else(|| corrupt("uid"))?;
        let joindate = hash
            .get("joindate")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| corrupt("joindate"))?;

        let mut take = |field: &str| hash.remove(field).unwrap_or_default();

        let mut record = Self {
            uid,
            joindate,
            username: take("username"),
            userslug: take("userslug"),
            fullname: take("fullname"),
            location: take("location"),
            birthday: take("birthday"),
            website: take("website"),
            email: Some(take("email")).filter(|e| !e.is_empty()),
            signature: take("signature"),
            picture: take("picture"),
            gravatarpicture: take("gravatarpicture"),
            uploadedpicture: take("uploadedpicture"),
            profileviews: take("profileviews").parse().unwrap_or(0),
            reputation: take("reputation").parse().unwrap_or(0),
            postcount: take("postcount").parse().unwrap_or(0),
            lastposttime: take("lastposttime").parse().unwrap_or(0),
            banned: take("banned") == "1",
            status: take("status").parse().unwrap_or_default(),
            extra: ExtensionFields::new(),
        };

        hash.remove("uid");
        hash.remove("joindate");
        let mut rest: Vec<_> = hash
            .into_iter()
            .filter(|(k, _)| !PRIVATE_FIELDS.contains(&k.as_str()))
            .collect();
        rest.sort();
        record.extra = rest.into_iter().collect();

        Ok(record)
    }
}
