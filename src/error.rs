// Unless explicitly stated otherwise all files in this repository are licensed under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2024 Datadog, Inc.

/// Errors returned when hashing with invalid arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("bucket count must be positive, got {0}")]
    InvalidBucketCount(i32),
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn message_names_the_bucket_count() {
        assert_eq!(
            Error::InvalidBucketCount(-5).to_string(),
            "bucket count must be positive, got -5"
        );
    }
}
