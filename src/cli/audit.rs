//! Single-URL audit command

use crate::cli::{AuditArgs, CommandContext, GlobalOptions};
use crate::error::{Error, Result};
use crate::orchestrator::{PageloadQuery, PageloadResponse};
use crate::output;

/// Run one audit and print the result.
///
/// The report is printed for every outcome; a non-200 status then becomes
/// an error so the process exits non-zero.
pub async fn run(opts: &GlobalOptions, args: &AuditArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let query = build_query(args);

    let response = ctx.orchestrator.handle(&query, &ctx.headers).await;
    output::print(&response, ctx.format)?;

    check_status(&response)
}

fn build_query(args: &AuditArgs) -> PageloadQuery {
    PageloadQuery {
        url: Some(args.url.clone()),
        strategy: Some(args.strategy.strategy.clone()),
        locale: args.strategy.locale.clone(),
        raw: args.raw,
        detail: args.detail,
    }
}

/// Map a non-200 response to [`Error::Request`].
pub fn check_status(response: &PageloadResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(Error::Request {
        status: response.status,
        message: response
            .error_message()
            .unwrap_or("no strategy succeeded")
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StrategyArgs;
    use crate::orchestrator::ResponseBody;

    #[test]
    fn test_build_query() {
        let args = AuditArgs {
            url: "https://example.com".to_string(),
            strategy: StrategyArgs {
                strategy: "desktop".to_string(),
                locale: Some("fr".to_string()),
            },
            raw: true,
            detail: false,
        };

        let request = build_query(&args).validate().unwrap();
        assert_eq!(request.url, "https://example.com/");
        assert_eq!(request.locale.as_deref(), Some("fr"));
        assert!(request.raw);
    }

    #[test]
    fn test_check_status() {
        let invalid = PageloadResponse {
            status: 400,
            retry_after_secs: None,
            body: ResponseBody::Invalid {
                error: "Invalid URL".to_string(),
            },
        };

        let err = check_status(&invalid).unwrap_err();
        assert!(matches!(err, Error::Request { status: 400, .. }));
        assert_eq!(err.to_string(), "Request failed with HTTP 400: Invalid URL");
    }
}
