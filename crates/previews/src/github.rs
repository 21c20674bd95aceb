//! Repository listing via the GitHub API.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::PreviewConfig;
use crate::error::PreviewError;

const PER_PAGE: usize = 100;

/// One record from the listing endpoint. Only `name` matters here;
/// records lacking it are skipped.
#[derive(Debug, Deserialize)]
pub struct RepoRecord {
    #[serde(default)]
    pub name: Option<String>,
}

/// List the names of every repository belonging to the configured owner.
///
/// Pages through the listing endpoint until a short page signals the
/// end. A listing failure is fatal for the run; it happens before any
/// fetch is dispatched.
pub async fn list_repo_names(
    client: &Client,
    config: &PreviewConfig,
) -> Result<Vec<String>, PreviewError> {
    let url = format!("{}/users/{}/repos", config.api_base, config.owner);

    let mut names = Vec::new();
    let mut page = 1usize;

    loop {
        let mut request = client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())]);

        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(PreviewError::StatusCode(response.status()));
        }

        let records: Vec<RepoRecord> = response.json().await?;
        let page_len = records.len();
        names.extend(collect_names(records));

        if page_len < PER_PAGE {
            break;
        }
        page += 1;
    }

    debug!(owner = %config.owner, count = names.len(), "Listed repositories");
    Ok(names)
}

fn collect_names(records: Vec<RepoRecord>) -> impl Iterator<Item = String> {
    records.into_iter().filter_map(|record| record.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_without_a_name_are_skipped() {
        let records: Vec<RepoRecord> = serde_json::from_str(
            r#"[
                {"name": "alpha", "fork": false},
                {"fork": true},
                {"name": null},
                {"name": "beta"}
            ]"#,
        )
        .unwrap();

        let names: Vec<String> = collect_names(records).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
