// =============================================================================
// Dashboard Page - Server-Rendered Shell
// =============================================================================
//
// One static HTML page drives the whole dashboard: it pulls the ticker, the
// asset registry, charts and predictions from the JSON API and renders
// candlesticks with Plotly loaded from its CDN. No build step, no bundler;
// the page is embedded in the binary.
// =============================================================================

use axum::response::Html;

/// GET / - the dashboard shell.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Crypto Next-Day High Dashboard</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  * { box-sizing: border-box; }
  body {
    margin: 0;
    background: linear-gradient(135deg, #FAF8F3, #F5F1E8);
    color: #2C2C2C;
    font-family: 'Pretendard', 'Noto Sans KR', sans-serif;
  }
  .ticker {
    width: 100%;
    background: linear-gradient(90deg, #E8E4D9, #DED9CC);
    border-bottom: 1px solid rgba(0,0,0,0.08);
    overflow: hidden;
    white-space: nowrap;
    height: 36px;
    line-height: 36px;
  }
  .ticker span {
    display: inline-block;
    animation: ticker-scroll 30s linear infinite;
    padding-right: 2rem;
    font-size: 14px;
    color: #5A5A5A;
  }
  @keyframes ticker-scroll {
    0% { transform: translateX(100%); }
    100% { transform: translateX(-100%); }
  }
  main { max-width: 960px; margin: 0 auto; padding: 1rem 1.5rem 2rem; }
  h1 { font-size: 1.6rem; }
  h2 { font-size: 1.2rem; display: flex; align-items: center; gap: 0.5rem; }
  h2 img { width: 40px; height: 40px; }
  nav { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-bottom: 1.5rem; }
  button {
    background: #FFFFFF;
    color: #2C2C2C;
    border: 1px solid rgba(0,0,0,0.12);
    border-radius: 6px;
    padding: 0.45rem 1rem;
    font-size: 14px;
    cursor: pointer;
  }
  button:hover { background: linear-gradient(90deg, #C9A57B, #A68B6A); color: #FFFFFF; }
  button.active { background: linear-gradient(90deg, #C9A57B, #A68B6A); color: #FFFFFF; }
  .range { display: flex; gap: 0.4rem; margin: 0.8rem 0; align-items: center; }
  .range label { font-size: 14px; color: #5A5A5A; }
  #chart { min-height: 400px; }
  .notice {
    padding: 0.7rem 1rem;
    border-radius: 6px;
    font-size: 14px;
    margin: 0.8rem 0;
    display: none;
  }
  .notice.info { background: #EFEBE0; color: #5A5A5A; display: block; }
  .notice.success { background: #E4EFE1; color: #2E5E33; display: block; }
  .notice.error { background: #F6E3E1; color: #8B3A33; display: block; }
  footer {
    text-align: center;
    color: #8B7355;
    padding: 1rem;
    font-size: 13px;
    border-top: 1px solid rgba(0,0,0,0.08);
    margin-top: 2rem;
  }
</style>
</head>
<body>
<div class="ticker"><span id="ticker-text">Loading prices...</span></div>
<main>
  <h1>Crypto Next-Day High Price Prediction Dashboard</h1>
  <nav id="asset-nav"></nav>

  <section id="asset-page" style="display:none">
    <h2><img id="asset-icon" src="" alt=""><span id="asset-title"></span></h2>
    <button id="predict-btn" onclick="predict()">Predict Next-Day High</button>
    <div id="predict-result" class="notice"></div>
    <div class="range">
      <label>Select time range (days):</label>
      <span id="range-buttons"></span>
    </div>
    <div id="chart-message" class="notice"></div>
    <div id="chart"></div>
  </section>

  <footer>
    <p>Data Sources: <strong>CoinGecko API</strong> &amp; <strong>Kraken API</strong></p>
    <p><em>This tool is developed solely for academic purposes and should not be used for financial or investment decisions.</em></p>
  </footer>
</main>

<script>
const state = { asset: null, days: 30, assets: [] };

async function loadTicker() {
  try {
    const resp = await fetch('/api/v1/ticker');
    const body = await resp.json();
    document.getElementById('ticker-text').textContent = body.text;
  } catch (e) {
    // Leave whatever is currently shown; the strip must never go blank.
  }
}

async function loadAssets() {
  const resp = await fetch('/api/v1/assets');
  state.assets = await resp.json();

  const nav = document.getElementById('asset-nav');
  nav.innerHTML = '';
  for (const asset of state.assets) {
    const btn = document.createElement('button');
    btn.textContent = asset.display_name;
    btn.id = 'nav-' + asset.id;
    btn.onclick = () => selectAsset(asset);
    nav.appendChild(btn);
  }
  if (state.assets.length > 0) {
    selectAsset(state.assets[0]);
  }
}

function selectAsset(asset) {
  state.asset = asset;
  state.days = asset.default_day_range;

  for (const a of state.assets) {
    document.getElementById('nav-' + a.id).classList.toggle('active', a.id === asset.id);
  }

  document.getElementById('asset-page').style.display = 'block';
  document.getElementById('asset-icon').src = asset.icon_url;
  document.getElementById('asset-title').textContent =
    asset.display_name + ' Next-Day High Price Prediction';

  const result = document.getElementById('predict-result');
  result.className = 'notice';
  result.textContent = '';

  renderRangeButtons();
  loadChart();
}

function renderRangeButtons() {
  const holder = document.getElementById('range-buttons');
  holder.innerHTML = '';
  for (const days of state.asset.day_ranges) {
    const btn = document.createElement('button');
    btn.textContent = days;
    btn.classList.toggle('active', days === state.days);
    btn.onclick = () => { state.days = days; renderRangeButtons(); loadChart(); };
    holder.appendChild(btn);
  }
}

async function loadChart() {
  const message = document.getElementById('chart-message');
  message.className = 'notice';

  try {
    const resp = await fetch('/api/v1/assets/' + state.asset.id + '/chart?days=' + state.days);
    const body = await resp.json();

    if (!resp.ok) {
      Plotly.purge('chart');
      message.className = 'notice error';
      message.textContent = body.error;
      return;
    }
    if (!body.chart) {
      Plotly.purge('chart');
      message.className = 'notice info';
      message.textContent = body.message;
      return;
    }
    Plotly.newPlot('chart', body.chart.data, body.chart.layout,
      { responsive: true, displayModeBar: false });
  } catch (e) {
    Plotly.purge('chart');
    message.className = 'notice error';
    message.textContent = 'Unable to load ' + state.asset.display_name + ' data: ' + e;
  }
}

async function predict() {
  const result = document.getElementById('predict-result');
  result.className = 'notice info';
  result.textContent = 'Fetching prediction...';

  try {
    const resp = await fetch('/api/v1/assets/' + state.asset.id + '/predict', { method: 'POST' });
    const body = await resp.json();
    if (body.status === 'success') {
      const usd = body.value.toLocaleString('en-US',
        { minimumFractionDigits: 2, maximumFractionDigits: 2 });
      result.className = 'notice success';
      result.textContent = 'Predicted Next-Day High: $' + usd + ' USD';
    } else {
      result.className = 'notice error';
      result.textContent = body.message;
    }
  } catch (e) {
    result.className = 'notice error';
    result.textContent = 'Prediction request failed: ' + e;
  }
}

window.onload = () => {
  loadTicker();
  loadAssets();
  setInterval(loadTicker, 60000);
};
</script>
</body>
</html>
"##;
