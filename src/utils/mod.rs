pub mod session_revocation;
