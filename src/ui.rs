use crate::models::{
    DashboardQuery, DashboardResponse, Diagnosis, FindingKind, Granularity, HeadlineMetrics, Metric,
};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "Marketing Performance Dashboard";

const EMPTY_MESSAGE: &str = "Loading data... add rows to the sheet to see the dashboard.";

/// Renders the full dashboard page. `error` is shown above the content when
/// the sheet could not be loaded.
///
/// The banner carries text from the sheet, so it is substituted last and
/// never scanned for placeholders.
pub fn render_index(query: &DashboardQuery, dashboard: &DashboardResponse, error: Option<&str>) -> String {
    INDEX_HTML
        .replace("{{TITLE}}", PAGE_TITLE)
        .replace("{{SIDEBAR}}", &render_sidebar(query))
        .replace("{{CONTENT}}", &render_content(dashboard))
        .replace("{{BANNER}}", &render_banner(error))
}

fn render_sidebar(query: &DashboardQuery) -> String {
    let mut html = String::new();
    html.push_str("<form class=\"sidebar\" method=\"get\" action=\"/\">\n");
    html.push_str("<h2>Analysis period</h2>\n<fieldset><legend>Group by</legend>\n");
    for granularity in Granularity::ALL {
        let checked = if granularity == query.granularity { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label><input type=\"radio\" name=\"view\" value=\"{}\"{checked} /> {}</label>",
            granularity.key(),
            granularity.label()
        );
    }
    html.push_str("</fieldset>\n<fieldset><legend>Metrics</legend>\n");
    html.push_str("<input type=\"hidden\" name=\"metrics\" value=\"\" />\n");
    for metric in Metric::ALL {
        let checked = if query.metrics.contains(&metric) { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label><input type=\"checkbox\" name=\"metrics\" value=\"{}\"{checked} /> {}</label>",
            metric.key(),
            metric.label()
        );
    }
    html.push_str("</fieldset>\n<button type=\"submit\">Apply</button>\n</form>");
    html
}

fn render_banner(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(
            "<div class=\"banner error\" role=\"alert\">Failed to load the sheet: {}</div>",
            escape_html(message)
        ),
        None => String::new(),
    }
}

fn render_content(dashboard: &DashboardResponse) -> String {
    let Some(headline) = &dashboard.headline else {
        return format!("<div class=\"banner info\">{EMPTY_MESSAGE}</div>");
    };

    let mut html = render_tiles(headline);
    html.push_str(&render_chart(dashboard));
    html.push_str(&render_table(dashboard));
    if let Some(diagnosis) = &dashboard.diagnosis {
        html.push_str(&render_diagnosis(diagnosis));
    }
    html
}

fn render_tiles(headline: &HeadlineMetrics) -> String {
    let mut html = String::from("<section class=\"panel\">\n");
    html.push_str(&tile("Today's visitors", headline.visitors, Some(headline.visitors_delta), false));
    html.push_str(&tile("Today's signups", headline.signups, Some(headline.signups_delta), false));
    html.push_str(&tile("Today's posts", headline.posts, None, false));
    html.push_str(&tile("Today's churned", headline.churned, None, true));
    let _ = writeln!(html, "</section>\n<p class=\"hint\">Latest day: {}</p>", headline.date);
    html
}

/// `inverse` marks tiles where growth is bad news.
fn tile(label: &str, value: u64, delta: Option<i64>, inverse: bool) -> String {
    let delta_html = match delta {
        Some(delta) => {
            let tone = match delta.signum() {
                0 => "flat",
                1 => "up",
                _ => "down",
            };
            format!("<span class=\"delta {tone}\">{delta:+}</span>")
        }
        None => String::new(),
    };
    let class = if inverse { "value inverse" } else { "value" };
    format!(
        "<div class=\"stat\"><span class=\"label\">{label}</span><span class=\"{class}\">{value}</span>{delta_html}</div>\n"
    )
}

fn render_chart(dashboard: &DashboardResponse) -> String {
    if dashboard.chart.is_empty() {
        return "<section class=\"chart-card\"><p class=\"hint\">Select at least one metric to draw the chart.</p></section>\n".to_string();
    }

    // Keep "</script>" inside labels from closing the data block.
    let data = serde_json::to_string(&dashboard.chart)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");

    format!(
        "<section class=\"chart-card\">\n<h2>{} trend</h2>\n\
         <svg id=\"chart\" viewBox=\"0 0 720 280\" role=\"img\" aria-label=\"Metric trend chart\"></svg>\n\
         <div id=\"legend\" class=\"legend\"></div>\n\
         <script id=\"chart-data\" type=\"application/json\">{data}</script>\n</section>\n",
        dashboard.granularity.label()
    )
}

fn render_table(dashboard: &DashboardResponse) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<section class=\"table-card\">\n<h2>{} performance</h2>\n<table id=\"records\">\n<thead><tr>\
         <th data-type=\"text\">Period</th>",
        dashboard.granularity.label()
    );
    for metric in Metric::ALL {
        let _ = write!(html, "<th data-type=\"number\">{}</th>", metric.label());
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &dashboard.table {
        let _ = write!(html, "<tr><td data-sort=\"{}\">{}</td>", row.record.date, row.period);
        for metric in Metric::ALL {
            let value = row.record.value(metric);
            let _ = write!(html, "<td data-sort=\"{value}\">{value}</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</section>\n");
    html
}

fn render_diagnosis(diagnosis: &Diagnosis) -> String {
    let mut html = String::from("<section class=\"diagnosis\">\n<div>\n<h2>Diagnosis</h2>\n");
    let _ = writeln!(
        html,
        "<ul class=\"ratios\"><li>Conversion rate <strong>{:.2}%</strong></li>\
         <li>Posts per signup <strong>{:.2}</strong></li>\
         <li>Churn rate <strong>{:.2}%</strong></li></ul>",
        diagnosis.conversion_rate, diagnosis.posts_per_signup, diagnosis.churn_rate
    );
    for finding in &diagnosis.findings {
        let class = if finding.kind == FindingKind::Stable { "ok" } else { "warn" };
        let _ = writeln!(
            html,
            "<p class=\"finding {class}\">{}</p>",
            escape_html(&finding.message)
        );
    }
    html.push_str("</div>\n<div>\n<h2>Suggestions</h2>\n<ol>\n");
    for suggestion in &diagnosis.suggestions {
        let _ = writeln!(html, "<li>{}</li>", escape_html(suggestion));
    }
    html.push_str("</ol>\n</div>\n</section>\n");
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f4f1ea;
      --ink: #2b2a28;
      --muted: #7a746d;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --good: #2d7a4b;
      --bad: #c63b2b;
      --card: #ffffff;
      --line: rgba(47, 72, 88, 0.1);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      grid-template-columns: 240px 1fr;
    }

    .sidebar {
      padding: 28px 20px;
      background: var(--accent-2);
      color: white;
      display: grid;
      align-content: start;
      gap: 16px;
      min-height: 100vh;
    }

    .sidebar h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    fieldset {
      border: 1px solid rgba(255, 255, 255, 0.25);
      border-radius: 12px;
      display: grid;
      gap: 6px;
    }

    .sidebar button {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-weight: 600;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }

    main {
      padding: 32px;
      display: grid;
      gap: 24px;
      align-content: start;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 3vw, 2.4rem);
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .banner {
      padding: 14px 18px;
      border-radius: 14px;
    }

    .banner.error {
      background: #fbe3df;
      color: var(--bad);
    }

    .banner.info {
      background: #e3eef6;
      color: var(--accent-2);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat,
    .chart-card,
    .table-card,
    .diagnosis > div {
      background: var(--card);
      border-radius: 18px;
      padding: 18px;
      border: 1px solid var(--line);
    }

    .stat {
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .delta.up {
      color: var(--good);
    }

    .delta.down {
      color: var(--bad);
    }

    .delta.flat {
      color: var(--muted);
    }

    #chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .chart-grid {
      stroke: var(--line);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .legend {
      display: flex;
      gap: 16px;
      flex-wrap: wrap;
      font-size: 0.9rem;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 12px;
      height: 12px;
      margin-right: 6px;
      border-radius: 3px;
      background: var(--swatch);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      text-align: right;
      padding: 8px 10px;
      border-bottom: 1px solid var(--line);
    }

    th:first-child,
    td:first-child {
      text-align: left;
    }

    th {
      cursor: pointer;
      user-select: none;
    }

    th[aria-sort="ascending"]::after {
      content: " \25B2";
    }

    th[aria-sort="descending"]::after {
      content: " \25BC";
    }

    .diagnosis {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
      gap: 16px;
    }

    .finding.warn {
      color: var(--bad);
    }

    .finding.ok {
      color: var(--good);
    }

    .hint {
      margin: 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    @media (max-width: 800px) {
      body {
        grid-template-columns: 1fr;
      }
      .sidebar {
        min-height: auto;
      }
    }
  </style>
</head>
<body>
  {{SIDEBAR}}
  <main>
    <header>
      <h1>{{TITLE}}</h1>
    </header>
    {{BANNER}}
    {{CONTENT}}
  </main>

  <script>
    const COLORS = ['#ff6b4a', '#2f4858', '#f2a541', '#3c9d9b', '#8e5572'];

    const formatAxisValue = (value) => {
      const rounded = Math.round(value * 10) / 10;
      return Number.isInteger(rounded) ? rounded.toString() : rounded.toFixed(1);
    };

    const renderChart = (chartEl, legendEl, series) => {
      const points = series.length ? series[0].points : [];
      if (!points.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const width = 720;
      const height = 280;
      const paddingX = 52;
      const paddingY = 34;
      const top = 20;

      const values = series.flatMap((s) => s.points.map((p) => p.value));
      let max = Math.max(0, ...values);
      if (max === 0) {
        max = 1;
      }

      const xStep = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const scaleY = (height - top - paddingY) / max;
      const x = (index) => paddingX + index * xStep;
      const y = (value) => height - paddingY - value * scaleY;

      let grid = '';
      const ticks = 4;
      for (let i = 0; i <= ticks; i += 1) {
        const value = (max * i) / ticks;
        const yPos = y(value);
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${formatAxisValue(value)}</text>`;
      }

      const labelEvery = Math.max(1, Math.ceil(points.length / 10));
      const xLabels = points
        .map((point, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          return `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.label}</text>`;
        })
        .join('');

      const lines = series
        .map((s, seriesIndex) => {
          const color = COLORS[seriesIndex % COLORS.length];
          const path = s.points
            .map((p, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(p.value).toFixed(2)}`)
            .join(' ');
          return `<path d="${path}" fill="none" stroke="${color}" stroke-width="3" />`;
        })
        .join('');

      chartEl.innerHTML = `${grid}${lines}${xLabels}`;
      legendEl.innerHTML = series
        .map((s, i) => `<span style="--swatch: ${COLORS[i % COLORS.length]}">${s.label}</span>`)
        .join('');
    };

    const makeSortable = (table) => {
      const headers = Array.from(table.querySelectorAll('th'));
      headers.forEach((th, column) => {
        th.addEventListener('click', () => {
          const ascending = th.getAttribute('aria-sort') !== 'ascending';
          headers.forEach((other) => other.removeAttribute('aria-sort'));
          th.setAttribute('aria-sort', ascending ? 'ascending' : 'descending');

          const numeric = th.dataset.type === 'number';
          const body = table.tBodies[0];
          const rows = Array.from(body.rows);
          rows.sort((a, b) => {
            const left = a.cells[column].dataset.sort;
            const right = b.cells[column].dataset.sort;
            const order = numeric ? Number(left) - Number(right) : left.localeCompare(right);
            return ascending ? order : -order;
          });
          rows.forEach((row) => body.appendChild(row));
        });
      });
    };

    const chartEl = document.getElementById('chart');
    const dataEl = document.getElementById('chart-data');
    if (chartEl && dataEl) {
      renderChart(chartEl, document.getElementById('legend'), JSON.parse(dataEl.textContent));
    }

    const table = document.getElementById('records');
    if (table) {
      makeSortable(table);
    }
  </script>
</body>
</html>
"#;
