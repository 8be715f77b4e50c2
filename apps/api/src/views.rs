//! Server-rendered HTML pages and htmx fragments.
//!
//! Every interpolated value goes through `text()` or `href()`.

use std::fmt::Write;

use axum::response::Html;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::jobs::feed::web_link;
use crate::matching::scorer::MatchResult;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::job_posting::JobPostingRow;
use crate::models::resume::ResumeRow;

const SUMMARY_PREVIEW_CHARS: usize = 200;

fn text(s: &str) -> std::borrow::Cow<'_, str> {
    encode_text(s)
}

/// Link target for untrusted URLs. Anything but http(s) renders as `#`.
fn href(url: &str) -> String {
    match web_link(url) {
        link if link.is_empty() => "#".to_string(),
        link => encode_double_quoted_attribute(&link).into_owned(),
    }
}

/// Wraps `body` in the shared page shell (Tailwind + htmx from CDN).
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} · JobHunter</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body class="bg-gray-100 min-h-screen">
  <nav class="bg-white shadow mb-6">
    <div class="max-w-6xl mx-auto px-4 py-3 flex gap-6">
      <a href="/" class="font-bold text-blue-700">JobHunter</a>
      <a href="/applications-page" class="text-gray-700 hover:text-blue-700">Applications</a>
      <a href="/resumes" class="text-gray-700 hover:text-blue-700">Resumes</a>
      <a href="/jobs/scrape" class="text-gray-700 hover:text-blue-700">Find Jobs</a>
    </div>
  </nav>
  <main class="max-w-6xl mx-auto px-4">
{body}
  </main>
</body>
</html>"#,
        title = text(title),
    ))
}

pub fn dashboard(applications: &[ApplicationRow]) -> Html<String> {
    let mut stats = String::new();
    for status in ApplicationStatus::ALL {
        let count = applications
            .iter()
            .filter(|a| a.status == status.as_str())
            .count();
        let _ = write!(
            stats,
            r#"<div class="bg-white rounded-lg shadow p-4"><p class="text-sm text-gray-500 capitalize">{}</p><p class="text-2xl font-semibold">{count}</p></div>"#,
            status.as_str()
        );
    }

    let body = format!(
        r#"<h1 class="text-2xl font-bold mb-4">Dashboard</h1>
<div class="grid grid-cols-5 gap-4 mb-6">{stats}</div>
{table}"#,
        table = applications_table(applications).0,
    );
    page("Dashboard", &body)
}

/// The `#applications-table` partial swapped in by htmx.
pub fn applications_table(applications: &[ApplicationRow]) -> Html<String> {
    let mut rows = String::new();
    for app in applications {
        let applied = app
            .applied_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());
        let _ = write!(
            rows,
            r#"<tr class="border-t">
  <td class="px-4 py-2"><a href="{url}" target="_blank" class="text-blue-600 hover:underline">{title}</a></td>
  <td class="px-4 py-2">{company}</td>
  <td class="px-4 py-2">{location}</td>
  <td class="px-4 py-2 capitalize">{status}</td>
  <td class="px-4 py-2">{applied}</td>
</tr>"#,
            url = href(&app.url),
            title = text(&app.title),
            company = text(&app.company),
            location = text(&app.location),
            status = text(&app.status),
        );
    }
    if applications.is_empty() {
        rows.push_str(
            r#"<tr><td colspan="5" class="px-4 py-6 text-center text-gray-500">No applications yet.</td></tr>"#,
        );
    }

    Html(format!(
        r#"<div id="applications-table" class="bg-white rounded-lg shadow overflow-hidden">
<table class="w-full text-left">
  <thead class="bg-gray-50 text-sm text-gray-600">
    <tr><th class="px-4 py-2">Title</th><th class="px-4 py-2">Company</th><th class="px-4 py-2">Location</th><th class="px-4 py-2">Status</th><th class="px-4 py-2">Applied</th></tr>
  </thead>
  <tbody>{rows}</tbody>
</table>
</div>"#
    ))
}

pub fn applications_page(applications: &[ApplicationRow]) -> Html<String> {
    let mut options = String::from(r#"<option value="">All</option>"#);
    for status in ApplicationStatus::ALL {
        let _ = write!(
            options,
            r#"<option value="{s}" class="capitalize">{s}</option>"#,
            s = status.as_str()
        );
    }
    let body = format!(
        r##"<h1 class="text-2xl font-bold mb-4">Applications</h1>
<div class="mb-4">
  <select name="status" hx-get="/applications" hx-target="#applications-table" hx-swap="outerHTML" class="border rounded px-3 py-2">{options}</select>
</div>
{table}"##,
        table = applications_table(applications).0,
    );
    page("Applications", &body)
}

pub fn resumes_page(resumes: &[ResumeRow]) -> Html<String> {
    let mut items = String::new();
    let mut options = String::new();
    for resume in resumes {
        let _ = write!(
            items,
            r#"<li class="border-t px-4 py-2 flex justify-between"><span>{name}</span><span class="text-sm text-gray-500">{uploaded}</span></li>"#,
            name = text(&resume.name),
            uploaded = resume.created_at.format("%Y-%m-%d %H:%M"),
        );
        let _ = write!(
            options,
            r#"<option value="{id}">{name}</option>"#,
            id = resume.id,
            name = text(&resume.name),
        );
    }
    if resumes.is_empty() {
        items.push_str(r#"<li class="px-4 py-6 text-center text-gray-500">No resumes uploaded.</li>"#);
    }

    let body = format!(
        r##"<h1 class="text-2xl font-bold mb-4">Resumes</h1>
<div class="grid grid-cols-2 gap-6">
  <form class="bg-white rounded-lg shadow p-4 space-y-3" action="/api/upload-resume" method="post" enctype="multipart/form-data">
    <h2 class="font-semibold">Upload</h2>
    <input name="candidate_name" placeholder="Name" required class="border rounded w-full px-3 py-2">
    <input name="candidate_email" type="email" placeholder="Email" required class="border rounded w-full px-3 py-2">
    <input name="file" type="file" accept=".pdf,.doc,.docx" required>
    <button class="bg-blue-600 text-white px-4 py-2 rounded hover:bg-blue-700">Upload</button>
  </form>
  <form class="bg-white rounded-lg shadow p-4 space-y-3" hx-post="/resumes/optimize" hx-target="#optimize-result">
    <h2 class="font-semibold">Optimize for a job</h2>
    <select name="resume_id" class="border rounded w-full px-3 py-2">{options}</select>
    <textarea name="job_description" rows="6" placeholder="Paste the job description" class="border rounded w-full px-3 py-2"></textarea>
    <button class="bg-green-600 text-white px-4 py-2 rounded hover:bg-green-700">Analyze</button>
    <div id="optimize-result"></div>
  </form>
</div>
<ul class="bg-white rounded-lg shadow mt-6">{items}</ul>"##
    );
    page("Resumes", &body)
}

/// Result fragment for `/resumes/optimize`.
pub fn match_result(result: &MatchResult) -> Html<String> {
    let missing = if result.missing.is_empty() {
        "none".to_string()
    } else {
        result.missing.join(", ")
    };
    let analysis = result
        .analysis
        .as_deref()
        .map(|a| {
            format!(
                r#"<p class="text-blue-700"><strong>Analysis:</strong> {}</p>"#,
                text(a)
            )
        })
        .unwrap_or_default();

    Html(format!(
        r#"<div class="bg-blue-50 border border-blue-200 rounded-lg p-4">
    <h4 class="font-semibold text-blue-800 mb-2">Optimization Results</h4>
    <p class="text-blue-700"><strong>Match Score:</strong> {score}%</p>
    <p class="text-blue-700"><strong>Missing Keywords:</strong> {missing}</p>
    <p class="text-blue-700"><strong>Suggestions:</strong> {suggestions}</p>
    {analysis}
    <p class="text-xs text-blue-400 mt-2">method: {method}</p>
</div>"#,
        score = result.score,
        missing = text(&missing),
        suggestions = text(&result.suggestions),
        method = result.method.as_str(),
    ))
}

pub fn scraper_page() -> Html<String> {
    let body = r##"<h1 class="text-2xl font-bold mb-4">Find Jobs</h1>
<form class="bg-white rounded-lg shadow p-4 space-y-3 mb-6" hx-post="/jobs/scrape" hx-target="#scrape-results">
  <input name="feed_url" type="url" placeholder="RSS or Atom feed URL" required class="border rounded w-full px-3 py-2">
  <input name="keywords" placeholder="Keywords, comma separated (optional)" class="border rounded w-full px-3 py-2">
  <button class="bg-blue-600 text-white px-4 py-2 rounded hover:bg-blue-700">Fetch</button>
</form>
<div id="scrape-results"></div>"##;
    page("Find Jobs", body)
}

/// Result fragment for `POST /jobs/scrape`.
pub fn scraped_jobs(postings: &[JobPostingRow]) -> Html<String> {
    let mut cards = String::new();
    for job in postings {
        let summary: String = job.description.chars().take(SUMMARY_PREVIEW_CHARS).collect();
        let ellipsis = if job.description.chars().count() > SUMMARY_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        let _ = write!(
            cards,
            r##"<div class="border border-gray-200 rounded-lg p-4 mb-3">
  <h4 class="font-semibold text-gray-800">{title}</h4>
  <p class="text-gray-600 text-sm">{company} • {location}</p>
  <p class="text-gray-500 text-sm mt-2">{summary}{ellipsis}</p>
  <div class="flex justify-between items-center mt-3">
    <a href="{url}" target="_blank" class="text-blue-600 hover:text-blue-800 text-sm">View Job</a>
    <button hx-post="/applications/create" hx-vals='{{"job_id": "{id}"}}' hx-target="#applications-table"
            class="bg-green-600 text-white px-3 py-1 rounded text-sm hover:bg-green-700">Save &amp; Apply</button>
  </div>
</div>"##,
            title = text(&job.title),
            company = text(&job.company),
            location = text(&job.location),
            summary = text(&summary),
            url = href(&job.url),
            id = job.id,
        );
    }

    Html(format!(
        r#"<div class="bg-green-50 border border-green-200 rounded-lg p-4 mb-4">
    <p class="text-green-700">Found {count} jobs from the RSS feed.</p>
</div>
<div class="space-y-3">{cards}</div>
<div id="applications-table"></div>"#,
        count = postings.len(),
    ))
}
