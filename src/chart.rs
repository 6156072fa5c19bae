// =============================================================================
// Candlestick Renderer - CandleSeries to Plotly Chart Spec
// =============================================================================
//
// Pure translation, no I/O and no clock reads: the same series always yields
// the same spec. The output mirrors what Plotly's `newPlot` expects (one
// candlestick trace plus a layout object), so the page hands it over without
// reshaping. An empty series renders as no chart at all rather than an empty
// frame; the caller decides how to present that.
// =============================================================================

use serde::Serialize;

use crate::market_data::CandleSeries;

/// Candle body and wick color for up days.
pub const UP_COLOR: &str = "#4CAF50";
/// Candle body and wick color for down days.
pub const DOWN_COLOR: &str = "#EF5350";

const CANDLE_LINE_WIDTH: f64 = 2.0;
const WHISKER_WIDTH: f64 = 0.7;
const CHART_HEIGHT: u32 = 400;
const PAPER_BG: &str = "#FAF8F3";
const PLOT_BG: &str = "#FFFFFF";
const FONT_COLOR: &str = "#3A3A3A";
const GRID_COLOR: &str = "rgba(0,0,0,0.08)";
const AXIS_LINE_COLOR: &str = "rgba(0,0,0,0.1)";

/// A complete Plotly figure: one candlestick trace plus its layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<CandlestickTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    /// Category labels, one per candle ("Nov 14").
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub increasing: DirectionStyle,
    pub decreasing: DirectionStyle,
    pub whiskerwidth: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionStyle {
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub height: u32,
    pub margin: Margin,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font: Font,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub hovermode: &'static str,
    pub hoverlabel: HoverLabel,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: &'static str,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    pub title: &'static str,
    /// Always "category": gaps for weekends and missing days collapse
    /// instead of leaving holes in the chart.
    #[serde(rename = "type")]
    pub axis_type: &'static str,
    pub gridcolor: &'static str,
    pub showline: bool,
    pub linecolor: &'static str,
    pub tickmode: &'static str,
    pub tick0: u32,
    pub dtick: u32,
    pub rangeslider: RangeSlider,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub title: &'static str,
    pub gridcolor: &'static str,
    pub showline: bool,
    pub linecolor: &'static str,
    pub tickprefix: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub bgcolor: &'static str,
    pub font: HoverFont,
    pub bordercolor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverFont {
    pub size: u32,
    pub color: &'static str,
}

/// Build the chart spec for `series`. Returns `None` for an empty series.
///
/// `asset_label` goes into the title ("Bitcoin 30-Day Candlestick Chart");
/// `day_range` picks the label density: the 7-day view labels every candle,
/// wider views every third so labels stay readable.
pub fn render(series: &CandleSeries, asset_label: &str, day_range: u32) -> Option<ChartSpec> {
    if series.is_empty() {
        return None;
    }

    let tick_interval = if day_range == 7 { 1 } else { 3 };

    let trace = CandlestickTrace {
        trace_type: "candlestick",
        x: series.iter().map(|c| c.date_label()).collect(),
        open: series.iter().map(|c| c.open).collect(),
        high: series.iter().map(|c| c.high).collect(),
        low: series.iter().map(|c| c.low).collect(),
        close: series.iter().map(|c| c.close).collect(),
        increasing: DirectionStyle {
            line: LineStyle {
                color: UP_COLOR,
                width: CANDLE_LINE_WIDTH,
            },
        },
        decreasing: DirectionStyle {
            line: LineStyle {
                color: DOWN_COLOR,
                width: CANDLE_LINE_WIDTH,
            },
        },
        whiskerwidth: WHISKER_WIDTH,
        opacity: 1.0,
    };

    let layout = Layout {
        title: format!("{asset_label} {day_range}-Day Candlestick Chart"),
        height: CHART_HEIGHT,
        margin: Margin {
            l: 20,
            r: 20,
            t: 40,
            b: 20,
        },
        paper_bgcolor: PAPER_BG,
        plot_bgcolor: PLOT_BG,
        font: Font {
            color: FONT_COLOR,
            size: 10,
        },
        xaxis: XAxis {
            title: "Date",
            axis_type: "category",
            gridcolor: GRID_COLOR,
            showline: true,
            linecolor: AXIS_LINE_COLOR,
            tickmode: "linear",
            tick0: 0,
            dtick: tick_interval,
            rangeslider: RangeSlider { visible: false },
        },
        yaxis: YAxis {
            title: "Price (USD)",
            gridcolor: GRID_COLOR,
            showline: true,
            linecolor: AXIS_LINE_COLOR,
            tickprefix: "$",
        },
        hovermode: "x unified",
        hoverlabel: HoverLabel {
            bgcolor: "white",
            font: HoverFont {
                size: 12,
                color: "#333",
            },
            bordercolor: AXIS_LINE_COLOR,
        },
        showlegend: false,
    };

    Some(ChartSpec {
        data: vec![trace],
        layout,
    })
}
