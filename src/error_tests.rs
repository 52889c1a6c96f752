//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::SentimentError;

    fn json_error() -> SentimentError {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        SentimentError::from(err)
    }

    #[test]
    fn test_api_error() {
        let err = SentimentError::Api("503 Service Unavailable".to_string());
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_json_error_from_serde() {
        let err = json_error();
        assert!(err.to_string().starts_with("JSON parsing error"));
    }

    #[test]
    fn test_config_error() {
        let err = SentimentError::Config("Missing API key".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_input_error() {
        let err = SentimentError::Input("missing 'review' column".to_string());
        assert!(err.to_string().contains("Invalid input"));
        assert!(err.to_string().contains("review"));
    }

    #[test]
    fn test_io_error_from_std() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "reviews.csv");
        let err = SentimentError::from(io);
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_config_error_from_config_crate() {
        let err = SentimentError::from(config::ConfigError::Message("bad key".into()));
        assert!(matches!(err, SentimentError::Config(_)));
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn test_only_json_counts_as_parse_failure() {
        assert!(json_error().is_parse_failure());
        assert!(!SentimentError::Api("timeout".into()).is_parse_failure());
        assert!(!SentimentError::Internal("x".into()).is_parse_failure());
    }

    #[test]
    fn test_error_is_debug() {
        let err = SentimentError::Api("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Api"));
    }

    #[test]
    fn test_error_variants_distinct() {
        let api = SentimentError::Api("test".to_string());
        let input = SentimentError::Input("test".to_string());

        assert_ne!(api.to_string(), input.to_string());
    }
}
