//! SDK error mapping.

use std::error::Error;

use aws_sdk_ec2::error::DisplayErrorContext;
use cloudsentry_protocols::CloudError;

/// Map an SDK error to [`CloudError::Api`], keeping the full source chain.
pub fn sdk_error<E: Error>(operation: &'static str) -> impl FnOnce(E) -> CloudError {
    move |err| CloudError::api(operation, DisplayErrorContext(&err).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl std::fmt::Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("AccessDenied")
        }
    }

    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("service error")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_sdk_error_keeps_source_chain() {
        let err = sdk_error("DescribeInstances")(Outer(Inner));
        let display = err.to_string();
        assert!(display.starts_with("DescribeInstances failed:"));
        assert!(display.contains("service error"));
        assert!(display.contains("AccessDenied"));
    }
}
