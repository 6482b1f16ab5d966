pub fn render_index(window_days: i64, server_key: bool) -> String {
    INDEX_HTML
        .replace("{{WINDOW_DAYS}}", &window_days.to_string())
        .replace("{{SERVER_KEY}}", if server_key { "true" } else { "false" })
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Student Posts Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1040px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    .controls {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 8px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    input,
    select {
      font: inherit;
      font-size: 1rem;
      text-transform: none;
      letter-spacing: normal;
      padding: 12px 16px;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.18);
      background: white;
      color: var(--ink);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
      transition: transform 150ms ease, box-shadow 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    button:disabled {
      opacity: 0.5;
      cursor: default;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      overflow-x: auto;
    }

    section {
      display: grid;
      gap: 12px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.95rem;
    }

    th,
    td {
      padding: 8px 12px;
      text-align: right;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    th:first-child,
    td:first-child {
      text-align: left;
    }

    th {
      color: #8b857d;
      font-weight: 500;
    }

    #heatmap {
      width: 100%;
      display: block;
    }

    #heatmap text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .heat-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .heat-value {
      font-size: 11px;
      font-weight: 600;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    .hidden {
      display: none;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
      button {
        width: 100%;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Student Posts Dashboard</h1>
      <p class="subtitle">Annotations and replies per student over the past {{WINDOW_DAYS}} days.</p>
    </header>

    <section class="controls">
      <label>
        Hypothesis API key
        <input id="api-key" type="password" autocomplete="off" placeholder="Paste your API key" />
      </label>
      <button id="load-groups" type="button">Load groups</button>
      <label>
        Group
        <select id="group" disabled>
          <option value="">Select a group</option>
        </select>
      </label>
    </section>

    <div class="status" id="status"></div>

    <div id="results" class="hidden">
      <section>
        <p class="subtitle" id="selected-group"></p>
        <div class="panel">
          <div class="stat">
            <span class="label">Students</span>
            <span class="value" id="stat-students">0</span>
          </div>
          <div class="stat">
            <span class="label">Annotations</span>
            <span class="value" id="stat-annotations">0</span>
          </div>
          <div class="stat">
            <span class="label">Replies</span>
            <span class="value" id="stat-replies">0</span>
          </div>
          <div class="stat">
            <span class="label">Skipped</span>
            <span class="value" id="stat-skipped">0</span>
          </div>
        </div>
      </section>

      <section>
        <h2>Number of Posts by Student (Past Week)</h2>
        <div class="card"><table id="counts-table"></table></div>
      </section>

      <section>
        <h2>Number of Posts by Student on Each Day (Past Week)</h2>
        <div class="card"><table id="daily-table"></table></div>
      </section>

      <section>
        <h2>Number of Posts by Student on Each Day (Heatmap)</h2>
        <div class="card">
          <svg id="heatmap" viewBox="0 0 600 120" aria-label="Posts heatmap" role="img"></svg>
        </div>
      </section>
    </div>

    <p class="hint">Days are calendar days in US Eastern time. Your key stays in this page and is only sent with each request.</p>
  </main>

  <script>
    const serverKey = {{SERVER_KEY}};
    const keyEl = document.getElementById('api-key');
    const loadGroupsEl = document.getElementById('load-groups');
    const groupEl = document.getElementById('group');
    const statusEl = document.getElementById('status');
    const resultsEl = document.getElementById('results');
    const selectedGroupEl = document.getElementById('selected-group');
    const countsTableEl = document.getElementById('counts-table');
    const dailyTableEl = document.getElementById('daily-table');
    const heatmapEl = document.getElementById('heatmap');

    const YL_GN_BU = ['#ffffd9', '#edf8b1', '#c7e9b4', '#7fcdbb', '#41b6c4', '#1d91c0', '#225ea8', '#253494', '#081d58'];

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (ch) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[ch]);

    const authHeaders = () => {
      const key = keyEl.value.trim();
      return key ? { authorization: `Bearer ${key}` } : {};
    };

    const request = async (url) => {
      const res = await fetch(url, { headers: authHeaders() });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const hexToRgb = (hex) => [1, 3, 5].map((i) => parseInt(hex.slice(i, i + 2), 16));

    const heatColor = (value, max) => {
      if (max <= 0) {
        return YL_GN_BU[0];
      }
      const scaled = (value / max) * (YL_GN_BU.length - 1);
      const low = Math.floor(scaled);
      const high = Math.min(low + 1, YL_GN_BU.length - 1);
      const t = scaled - low;
      const a = hexToRgb(YL_GN_BU[low]);
      const b = hexToRgb(YL_GN_BU[high]);
      const mix = a.map((channel, i) => Math.round(channel + (b[i] - channel) * t));
      return `rgb(${mix.join(',')})`;
    };

    const renderCounts = (counts) => {
      if (!counts.length) {
        countsTableEl.innerHTML = '<tr><td>No posts in this window.</td></tr>';
        return;
      }
      const rows = counts
        .map((row) => `<tr><td>${escapeHtml(row.student)}</td><td>${row.annotations}</td><td>${row.replies}</td></tr>`)
        .join('');
      countsTableEl.innerHTML = `<thead><tr><th>Student</th><th>Annotations</th><th>Replies</th></tr></thead><tbody>${rows}</tbody>`;
    };

    const renderDaily = (daily) => {
      if (!daily.rows.length) {
        dailyTableEl.innerHTML = '<tr><td>No posts in this window.</td></tr>';
        return;
      }
      const head = daily.days.map((day) => `<th>${escapeHtml(day)}</th>`).join('');
      const rows = daily.rows
        .map((row) => `<tr><td>${escapeHtml(row.student)}</td>${row.counts.map((c) => `<td>${c}</td>`).join('')}</tr>`)
        .join('');
      dailyTableEl.innerHTML = `<thead><tr><th>Student</th>${head}</tr></thead><tbody>${rows}</tbody>`;
    };

    const renderHeatmap = (daily) => {
      if (!daily.rows.length) {
        heatmapEl.setAttribute('viewBox', '0 0 600 120');
        heatmapEl.innerHTML = '<text class="heat-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const labelWidth = 120;
      const top = 16;
      const bottom = 40;
      const cell = Math.max(28, Math.min(72, Math.floor((600 - labelWidth) / daily.days.length)));
      const width = labelWidth + cell * daily.days.length + 8;
      const height = top + cell * daily.rows.length + bottom;
      const max = Math.max(0, ...daily.rows.flatMap((row) => row.counts));

      let cells = '';
      daily.rows.forEach((row, r) => {
        const y = top + r * cell;
        cells += `<text class="heat-label" x="${labelWidth - 8}" y="${y + cell / 2 + 4}" text-anchor="end">${escapeHtml(row.student)}</text>`;
        row.counts.forEach((count, c) => {
          const x = labelWidth + c * cell;
          const fill = heatColor(count, max);
          const ink = max > 0 && count / max > 0.55 ? 'white' : '#2b2a28';
          cells += `<rect x="${x}" y="${y}" width="${cell - 2}" height="${cell - 2}" rx="4" fill="${fill}"><title>${escapeHtml(row.student)} ${escapeHtml(daily.days[c])}: ${count}</title></rect>`;
          cells += `<text class="heat-value" x="${x + (cell - 2) / 2}" y="${y + cell / 2 + 3}" text-anchor="middle" fill="${ink}">${count}</text>`;
        });
      });

      const xLabels = daily.days
        .map((day, c) => `<text class="heat-label" x="${labelWidth + c * cell + (cell - 2) / 2}" y="${top + cell * daily.rows.length + 18}" text-anchor="middle">${escapeHtml(day)}</text>`)
        .join('');

      heatmapEl.setAttribute('viewBox', `0 0 ${width} ${height}`);
      heatmapEl.innerHTML = `${cells}${xLabels}`;
    };

    const renderReport = (report, groupName) => {
      const totals = report.counts.reduce(
        (acc, row) => ({ annotations: acc.annotations + row.annotations, replies: acc.replies + row.replies }),
        { annotations: 0, replies: 0 }
      );
      selectedGroupEl.textContent = `You've selected the group: ${groupName}`;
      document.getElementById('stat-students').textContent = report.counts.length;
      document.getElementById('stat-annotations').textContent = totals.annotations;
      document.getElementById('stat-replies').textContent = totals.replies;
      document.getElementById('stat-skipped').textContent = report.skipped;
      renderCounts(report.counts);
      renderDaily(report.daily);
      renderHeatmap(report.daily);
      resultsEl.classList.remove('hidden');
    };

    const loadGroups = async () => {
      if (!keyEl.value.trim() && !serverKey) {
        setStatus('Please enter your Hypothesis API key.', 'error');
        return;
      }
      setStatus('Loading groups...', 'info');
      const groups = await request('/api/groups');
      groupEl.innerHTML = '<option value="">Select a group</option>';
      groups.forEach((group) => {
        const option = document.createElement('option');
        option.value = group.id;
        option.textContent = group.name;
        groupEl.appendChild(option);
      });
      groupEl.disabled = groups.length === 0;
      if (groups.length === 0) {
        setStatus('No groups found. Please check your Hypothesis account or try again.', 'error');
      } else {
        setStatus(`Found ${groups.length} groups.`, 'ok');
      }
    };

    const loadReport = async () => {
      const groupId = groupEl.value;
      if (!groupId) {
        resultsEl.classList.add('hidden');
        return;
      }
      const groupName = groupEl.options[groupEl.selectedIndex].textContent;
      setStatus('Loading posts...', 'info');
      const report = await request(`/api/report?group=${encodeURIComponent(groupId)}`);
      renderReport(report, groupName);
      if (report.fetch_error) {
        setStatus(`Failed to fetch student posts: ${report.fetch_error}`, 'error');
      } else {
        setStatus(`Loaded ${report.total_records} posts.`, 'ok');
      }
    };

    loadGroupsEl.addEventListener('click', () => {
      loadGroups().catch((err) => setStatus(err.message, 'error'));
    });

    keyEl.addEventListener('keydown', (event) => {
      if (event.key === 'Enter') {
        loadGroups().catch((err) => setStatus(err.message, 'error'));
      }
    });

    groupEl.addEventListener('change', () => {
      loadReport().catch((err) => setStatus(err.message, 'error'));
    });

    if (serverKey) {
      loadGroups().catch((err) => setStatus(err.message, 'error'));
    } else {
      setStatus('Please enter your Hypothesis API key.', '');
    }
  </script>
</body>
</html>
"##;
