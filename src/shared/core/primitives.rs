// Identifier primitives shared by every module.
//
// The tracker API hands out integer ids for every resource. Aliases keep call
// sites readable without wrapping values the server already owns.

pub type UserId = i64;
pub type ProjectId = i64;
pub type TaskId = i64;
pub type AssignmentId = i64;
pub type NoteId = i64;
pub type ImageId = i64;
