//! Backend initialization errors.
//!
//! The tessellation engine itself is infallible: degenerate paths and
//! singular transforms degrade to empty draws. Errors exist only at the
//! backend boundary, where an unusable rendering environment (failed
//! shader compile, missing device resources) must fail construction
//! loudly instead of limping through a session.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("shader program link failed: {0}")]
    ShaderLink(String),

    #[error("backend resource creation failed: {0}")]
    ResourceCreation(String),

    #[error("backend initialization failed: {0}")]
    BackendInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = Error::ShaderCompile("fill.frag: syntax error".into());
        assert_eq!(
            e.to_string(),
            "shader compilation failed: fill.frag: syntax error"
        );
    }
}
