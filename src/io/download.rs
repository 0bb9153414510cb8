use std::path::{Path, PathBuf};

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{WorkingGroup, WorkingGroupList};
use crate::parser::catalog::{
    member_list_links, minutes_links, minutes_list_link, resolve_url, working_group_id,
    working_group_links,
};

/// Index page of the council's working groups
pub const COUNCIL_INDEX_URL: &str = "https://www.mext.go.jp/b_menu/shingi/chukyo/chukyo3/index.htm";

/// Configuration for page retrieval
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory the pages are saved into
    pub dir: PathBuf,
    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            user_agent: format!("meroku/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// URLs fetched and failed in one download run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadReport {
    pub downloaded: Vec<String>,
    pub failed: Vec<String>,
}

impl DownloadReport {
    /// Save as `report_<timestamp>.json` in `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        self.save_named(dir, "report")
    }

    /// Save as `<name>_<timestamp>.json` in `dir`
    pub fn save_named(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        let stamp = chrono::Local::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("{}_{}.json", name, stamp));
        super::output::write_json(self, &path)?;
        Ok(path)
    }

    pub fn merge(&mut self, other: DownloadReport) {
        self.downloaded.extend(other.downloaded);
        self.failed.extend(other.failed);
    }
}

/// File name a URL is saved under: its last path segment
pub fn file_name_for(url: &str) -> Option<&str> {
    url.split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit('/').next())
        .filter(|name| !name.is_empty())
}

/// File-name prefix that carries a group's order and id, e.g. "no03wg057-"
pub fn working_group_prefix(wg: &WorkingGroup) -> String {
    format!("{}wg{}-", wg.order, wg.id)
}

/// Resolve every link against `base`, dropping the ones that do not parse
fn absolute_urls(base: &str, hrefs: Vec<String>) -> Vec<String> {
    hrefs
        .iter()
        .filter_map(|href| match resolve_url(base, href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring link: {}", e);
                None
            }
        })
        .collect()
}

pub struct Downloader {
    client: Client,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = Client::builder().user_agent(config.user_agent.as_str()).build()?;
        Ok(Self { client, config })
    }

    async fn fetch(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::Download {
                url: url.to_string(),
                status: status.to_string(),
            });
        }
        Ok(response)
    }

    /// Fetch one page as text
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);
        Ok(self.fetch(url).await?.text().await?)
    }

    /// Fetch one URL and write the body to `path`
    pub async fn download(&self, url: &str, path: &Path) -> Result<()> {
        let body = self.fetch(url).await?.bytes().await?;
        std::fs::write(path, &body).map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    /// Fetch every URL into the configured directory, prefixing file names with `prefix`
    ///
    /// Failures are recorded in the report; the run continues.
    pub async fn download_all(&self, urls: &[String], prefix: &str) -> Result<DownloadReport> {
        self.download_into(urls, &self.config.dir, prefix).await
    }

    /// Read the council index at `root_url` and describe every working group on it
    ///
    /// Groups are keyed "no00", "no01", ... in page order. A group whose
    /// pages cannot be read is kept with empty link lists.
    pub async fn discover_working_groups(&self, root_url: &str) -> Result<WorkingGroupList> {
        let index = self.fetch_text(root_url).await?;
        let mut groups = WorkingGroupList::new();

        for (idx, (name, href)) in working_group_links(&index).into_iter().enumerate() {
            let url = match resolve_url(root_url, &href) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Skipping working group {}: {}", name, e);
                    continue;
                }
            };
            let mut wg = WorkingGroup {
                order: format!("no{:02}", idx),
                id: working_group_id(&url).unwrap_or_default(),
                name,
                url,
                ..Default::default()
            };
            if let Err(e) = self.describe_working_group(&mut wg).await {
                warn!("Incomplete working group {} ({}): {}", wg.name, wg.id, e);
            }
            groups.insert(wg.order.clone(), wg);
        }

        info!("Found {} working groups", groups.len());
        Ok(groups)
    }

    /// Fill in a group's roster links, archive page and transcript links
    async fn describe_working_group(&self, wg: &mut WorkingGroup) -> Result<()> {
        let page = self.fetch_text(&wg.url).await?;

        wg.member_list_urls = absolute_urls(&wg.url, member_list_links(&page));
        if wg.member_list_urls.is_empty() {
            warn!("No roster links for {} ({})", wg.name, wg.id);
        }

        let Some(href) = minutes_list_link(&page) else {
            warn!("No minutes archive link for {} ({})", wg.name, wg.id);
            return Ok(());
        };
        wg.minutes_list_url = resolve_url(&wg.url, &href)?;

        let archive = self.fetch_text(&wg.minutes_list_url).await?;
        wg.minutes_urls = absolute_urls(&wg.minutes_list_url, minutes_links(&archive));
        debug!("{} ({}): {} transcripts", wg.name, wg.id, wg.minutes_urls.len());
        Ok(())
    }

    /// Save a group's transcripts to `<dir>/html` and, optionally, its rosters
    /// to `<dir>/html/memberlist`, named `<order>wg<id>-<file>`
    pub async fn download_working_group(
        &self,
        wg: &WorkingGroup,
        with_member_list: bool,
    ) -> Result<DownloadReport> {
        let prefix = working_group_prefix(wg);
        let html_dir = self.config.dir.join("html");
        let mut report = DownloadReport::default();

        if with_member_list {
            let roster_dir = html_dir.join("memberlist");
            report.merge(self.download_into(&wg.member_list_urls, &roster_dir, &prefix).await?);
        }
        report.merge(self.download_into(&wg.minutes_urls, &html_dir, &prefix).await?);

        info!(
            "{} ({}): {} saved, {} failed",
            wg.name,
            wg.id,
            report.downloaded.len(),
            report.failed.len()
        );
        Ok(report)
    }

    async fn download_into(&self, urls: &[String], dir: &Path, prefix: &str) -> Result<DownloadReport> {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let mut report = DownloadReport::default();
        for url in urls {
            let Some(name) = file_name_for(url) else {
                warn!("No file name in URL {}, skipping", url);
                report.failed.push(url.clone());
                continue;
            };
            let path = dir.join(format!("{}{}", prefix, name));

            match self.download(url, &path).await {
                Ok(()) => {
                    info!("Saved {} to {:?}", url, path);
                    report.downloaded.push(url.clone());
                }
                Err(e) => {
                    warn!("Download failed: {}", e);
                    report.failed.push(url.clone());
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_for() {
        assert_eq!(
            file_name_for("https://www.mext.go.jp/b_menu/shingi/chukyo/chukyo3/057/gijiroku/1373922.htm"),
            Some("1373922.htm")
        );
        assert_eq!(file_name_for("https://example.invalid/a/b.htm?x=1"), Some("b.htm"));
        assert_eq!(file_name_for("https://example.invalid/dir/"), None);
    }

    #[test]
    fn test_working_group_prefix() {
        let wg = WorkingGroup {
            order: "no03".to_string(),
            id: "057".to_string(),
            ..Default::default()
        };
        let prefix = working_group_prefix(&wg);
        assert_eq!(prefix, "no03wg057-");

        let name = format!("{}{}", prefix, "1373922.htm");
        assert_eq!(
            crate::parser::working_group_info(&name),
            Some(("03".to_string(), "057".to_string()))
        );
    }

    #[test]
    fn test_report_merge() {
        let mut report = DownloadReport {
            downloaded: vec!["a".to_string()],
            failed: vec![],
        };
        report.merge(DownloadReport {
            downloaded: vec!["b".to_string()],
            failed: vec!["c".to_string()],
        });
        assert_eq!(report.downloaded, vec!["a", "b"]);
        assert_eq!(report.failed, vec!["c"]);
    }

    /// Serve fixed pages on localhost; unknown paths get 404
    async fn serve(pages: Vec<(&'static str, &'static str)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let pages = pages.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let response = match pages.iter().find(|(p, _)| *p == path) {
                        Some((_, body)) => format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        ),
                        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
                    };
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    const INDEX: &str = r#"<html><body><div class="shingi_block"><ul>
        <li><a href="/chukyo3/057/index.htm">教職課程ワーキンググループ</a></li>
        <li><a href="/chukyo3/058/index.htm">閉鎖されたワーキンググループ</a></li>
        </ul></div></body></html>"#;

    const GROUP_PAGE: &str = r#"<html><body>
        <a href="gijiroku/index.htm">これまでの議事要旨・議事録・配付資料の一覧はこちら</a>
        <a href="meibo.htm">委員名簿</a>
        </body></html>"#;

    const ARCHIVE: &str = r#"<html><body>
        <a href="1.htm">議事録</a><a href="2.htm">議事要旨</a><a href="3.htm">議事録</a>
        </body></html>"#;

    #[tokio::test]
    async fn test_discover_and_download_working_group() {
        let base = serve(vec![
            ("/chukyo3/index.htm", INDEX),
            ("/chukyo3/057/index.htm", GROUP_PAGE),
            ("/chukyo3/057/gijiroku/index.htm", ARCHIVE),
            ("/chukyo3/057/gijiroku/1.htm", "<html>1</html>"),
            ("/chukyo3/057/meibo.htm", "<html>meibo</html>"),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(DownloadConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();

        let groups = downloader
            .discover_working_groups(&format!("{}/chukyo3/index.htm", base))
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        let wg = &groups["no00"];
        assert_eq!(wg.id, "057");
        assert_eq!(wg.name, "教職課程ワーキンググループ");
        assert_eq!(wg.minutes_list_url, format!("{}/chukyo3/057/gijiroku/index.htm", base));
        assert_eq!(
            wg.minutes_urls,
            vec![
                format!("{}/chukyo3/057/gijiroku/1.htm", base),
                format!("{}/chukyo3/057/gijiroku/3.htm", base),
            ]
        );
        assert_eq!(wg.member_list_urls, vec![format!("{}/chukyo3/057/meibo.htm", base)]);

        // Unreachable group page leaves the group without links
        let closed = &groups["no01"];
        assert_eq!(closed.id, "058");
        assert!(closed.minutes_urls.is_empty());

        let report = downloader.download_working_group(wg, true).await.unwrap();
        assert_eq!(report.downloaded.len(), 2);
        assert_eq!(report.failed, vec![format!("{}/chukyo3/057/gijiroku/3.htm", base)]);
        assert!(dir.path().join("html").join("no00wg057-1.htm").is_file());
        assert!(dir.path().join("html").join("memberlist").join("no00wg057-meibo.htm").is_file());
    }

    #[test]
    fn test_report_save() {
        let dir = tempfile::tempdir().unwrap();
        let report = DownloadReport {
            downloaded: vec!["https://example.invalid/a.htm".to_string()],
            failed: vec![],
        };

        let path = report.save(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report_") && name.ends_with(".json"));

        let loaded: DownloadReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.downloaded.len(), 1);
    }
}
