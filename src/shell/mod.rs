// Composition root of the client binary.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the HTTP gateway, file session storage, terminal confirmation and tracing
//   notifications, and wire them into one session.
// - Parse the command line and drive the session.

pub mod cli;
pub mod config;
