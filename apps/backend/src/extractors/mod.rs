pub mod participant_session;
pub mod room_code;
pub mod validated_json;

pub use participant_session::{RoomParticipant, SessionToken};
pub use room_code::CurrentRoom;
pub use validated_json::ValidatedJson;
