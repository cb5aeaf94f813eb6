//! Record type and attribute names the related-activities rewrite is built around.

pub const ACTIVITY_ENTITY: &str = "activity-pointer";
pub const ACTIVITY_ID: &str = "activity-id";
pub const REGARDING_OBJECT_ID: &str = "regarding-object-id";
pub const COMMUNICATION_ACTIVITY_ID: &str = "communication-activity-id";
pub const SUBJECT: &str = "subject";
pub const DESCRIPTION: &str = "description";

pub const PARTY_ENTITY: &str = "activity-party";
pub const PARTY_ID: &str = "party-id";
pub const PARTY_ALIAS: &str = "activity-party";

pub const RELATIONSHIP_ENTITY: &str = "personal-relationship";
pub const RELATIONSHIP_ID: &str = "personal-relationship-id";
pub const PERSON_1_ID: &str = "person-1-id";
pub const PERSON_2_ID: &str = "person-2-id";
pub const RELATIONSHIP_TYPE_REF: &str = "relationship-type-1-id";

pub const RELATIONSHIP_TYPE_ENTITY: &str = "personal-relationship-type";
pub const RELATIONSHIP_TYPE_ID: &str = "personal-relationship-type-id";
pub const IS_SPOUSAL: &str = "is-spousal";
pub const RELATIONSHIP_STATUS_REF: &str = "relationship-status-id";

pub const STATUS_ENTITY: &str = "status";
pub const STATUS_ID: &str = "status-id";
pub const STATUS_NAME: &str = "name";

pub const ORGANIZATION_ENTITY: &str = "account";
pub const ORGANIZATION_ID: &str = "account-id";
pub const PARENT_ORGANIZATION_ID: &str = "parent-account-id";

/// A communication subsystem whose activities mirror a primary activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MirrorChannel {
	pub entity: &'static str,
	pub alias: &'static str,
}

pub const MIRROR_CHANNELS: [MirrorChannel; 3] = [
	MirrorChannel { entity: "letter", alias: "remove-letter" },
	MirrorChannel { entity: "email", alias: "remove-email" },
	MirrorChannel { entity: "phone-call", alias: "remove-phone" },
];
