//! Declarative widget bindings per section.
//!
//! Every widget a section owns is described here as data. The orchestrator
//! walks these tables uniformly, so a new section is one more entry in
//! [`bindings_for`] and nothing else.

use super::format::Fmt;
use super::section::Section;

#[derive(Debug)]
pub struct SectionBindings {
    pub status: &'static str,
    pub loading: &'static str,
    pub tables: &'static [TableBinding],
    pub charts: &'static [ChartBinding],
    pub text_slots: &'static [TextBinding],
    pub export: ExportLayout,
}

#[derive(Debug)]
pub struct TableBinding {
    pub id: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    /// Row shown while a request for the section is in flight.
    pub placeholder: Option<&'static str>,
    pub source: TableSource,
}

#[derive(Debug)]
pub struct Metric {
    pub key: &'static str,
    pub label: &'static str,
    pub fmt: Fmt,
}

#[derive(Debug)]
pub struct Column {
    pub key: &'static str,
    pub fmt: Fmt,
}

#[derive(Debug)]
pub struct KeyedRow {
    pub key: &'static str,
    pub columns: &'static [Column],
}

#[derive(Debug)]
pub enum TableSource {
    /// `label | value` rows read from one object. An empty container is the
    /// payload root, which counts as present when any metric is present.
    Metrics {
        container: &'static str,
        metrics: &'static [Metric],
    },
    /// One row per element of a record list.
    Records {
        container: &'static str,
        columns: &'static [Column],
    },
    /// One row per declared key of an object, led by the key itself.
    Keyed {
        container: &'static str,
        rows: &'static [KeyedRow],
    },
}

#[derive(Debug)]
pub struct TextBinding {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub fmt: Fmt,
    pub placeholder: Option<&'static str>,
    pub fallback: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Time series over the requested date range.
    Continuous,
    /// Shares of a common total.
    Proportional,
}

#[derive(Debug)]
pub enum SeriesSource {
    /// Parallel `dates/open/high/low/close` arrays.
    Candles { container: &'static str },
    /// Parallel x/y arrays drawn as one line.
    Line {
        container: &'static str,
        x: &'static str,
        y: &'static str,
        label: &'static str,
    },
    /// Transactions summed per day, token and side.
    DailyFlows { container: &'static str },
    /// Records weighted by `volume * delta`.
    Shares {
        container: &'static str,
        label: &'static str,
        volume: &'static str,
        delta: &'static str,
    },
}

#[derive(Debug)]
pub struct ChartBinding {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub error_slot: &'static str,
    pub source: SeriesSource,
}

#[derive(Debug)]
pub struct ExportColumn {
    pub key: &'static str,
    pub label: &'static str,
    pub fmt: Fmt,
}

#[derive(Debug)]
pub enum ExportSource {
    /// Parallel arrays indexed by `index`.
    Parallel {
        container: &'static str,
        index: &'static str,
        index_label: &'static str,
        columns: &'static [ExportColumn],
    },
    Records {
        container: &'static str,
        columns: &'static [ExportColumn],
    },
}

#[derive(Debug)]
pub struct ExportLayout {
    pub title: &'static str,
    pub source: ExportSource,
}

pub const FETCHING_ROW: &str = "Fetching data...";
pub const NO_DATA_ROW: &str = "No data available";
pub const NO_RANGE_DATA: &str = "No data available for the selected range";

const MARKET_METRICS: &[Metric] = &[
    Metric { key: "price", label: "Price (USD)", fmt: Fmt::Currency },
    Metric { key: "percent_change_24h", label: "24h Change (%)", fmt: Fmt::Percent },
    Metric { key: "market_cap", label: "Market Cap (USD)", fmt: Fmt::Currency },
    Metric { key: "volume_24h", label: "24h Volume (USD)", fmt: Fmt::Currency },
];

const PERFORMANCE_METRICS: &[Metric] = &[
    Metric { key: "percent_change_24h", label: "24h", fmt: Fmt::Percent },
    Metric { key: "percent_change_7d", label: "7d", fmt: Fmt::Percent },
    Metric { key: "percent_change_30d", label: "30d", fmt: Fmt::Percent },
];

const TOP_FLOW_COLUMNS: &[Column] = &[
    Column { key: "time", fmt: Fmt::Timestamp },
    Column { key: "input_total_usd", fmt: Fmt::Currency },
    Column { key: "output_total_usd", fmt: Fmt::Currency },
    Column { key: "is_confirmed", fmt: Fmt::Flag },
];

const BTC_FLOW_METRICS: &[Metric] = &[
    Metric { key: "inflows", label: "Inflows (BTC)", fmt: Fmt::Quantity(2) },
    Metric { key: "outflows", label: "Outflows (BTC)", fmt: Fmt::Quantity(2) },
    Metric { key: "net_flow", label: "Net Flow (BTC)", fmt: Fmt::Quantity(2) },
];

const ETH_FLOW_METRICS: &[Metric] = &[
    Metric { key: "inflows", label: "Inflows (ETH)", fmt: Fmt::Quantity(2) },
    Metric { key: "outflows", label: "Outflows (ETH)", fmt: Fmt::Quantity(2) },
    Metric { key: "net_flow", label: "Net Flow (ETH)", fmt: Fmt::Quantity(2) },
];

const PRICE_HISTORY_EXPORT: ExportSource = ExportSource::Parallel {
    container: "price_history",
    index: "dates",
    index_label: "Date",
    columns: &[
        ExportColumn { key: "open", label: "Open (USD)", fmt: Fmt::Currency },
        ExportColumn { key: "high", label: "High (USD)", fmt: Fmt::Currency },
        ExportColumn { key: "low", label: "Low (USD)", fmt: Fmt::Currency },
        ExportColumn { key: "close", label: "Close (USD)", fmt: Fmt::Currency },
    ],
};

static BITCOIN: SectionBindings = SectionBindings {
    status: "bitcoin-status",
    loading: "bitcoin-loading",
    tables: &[
        TableBinding {
            id: "marketStatsTableBody",
            title: "Market Stats",
            columns: &["Metric", "Value"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics { container: "markets", metrics: MARKET_METRICS },
        },
        TableBinding {
            id: "performanceTableBody",
            title: "Performance",
            columns: &["Period", "Change"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics { container: "yields", metrics: PERFORMANCE_METRICS },
        },
        TableBinding {
            id: "topFlowsTableBody",
            title: "Top Flows",
            columns: &["Time", "Input (USD)", "Output (USD)", "Status"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Records { container: "top_flows", columns: TOP_FLOW_COLUMNS },
        },
        TableBinding {
            id: "flowsTableBody",
            title: "Exchange Flows",
            columns: &["Flow", "Amount"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics { container: "", metrics: BTC_FLOW_METRICS },
        },
    ],
    charts: &[
        ChartBinding {
            id: "priceTrendChart",
            title: "Price Trend (USD)",
            kind: ChartKind::Continuous,
            error_slot: "priceTrendError",
            source: SeriesSource::Candles { container: "price_history" },
        },
        ChartBinding {
            id: "feesChart",
            title: "Transaction Fees (USD)",
            kind: ChartKind::Continuous,
            error_slot: "feesError",
            source: SeriesSource::Line {
                container: "fees",
                x: "dates",
                y: "values",
                label: "Transaction Fees",
            },
        },
    ],
    text_slots: &[
        TextBinding {
            id: "lastUpdated",
            label: "Last updated",
            path: "markets.last_updated",
            fmt: Fmt::Timestamp,
            placeholder: None,
            fallback: "Not available",
        },
        TextBinding {
            id: "marketAnalysis",
            label: "Analysis",
            path: "analysis",
            fmt: Fmt::Text,
            placeholder: Some("Fetching analysis..."),
            fallback: "No analysis available",
        },
        TextBinding {
            id: "marketConclusion",
            label: "Conclusion",
            path: "conclusion",
            fmt: Fmt::Text,
            placeholder: Some("Fetching conclusion..."),
            fallback: "No conclusion available",
        },
    ],
    export: ExportLayout {
        title: "Bitcoin Price History",
        source: PRICE_HISTORY_EXPORT,
    },
};

static ETH: SectionBindings = SectionBindings {
    status: "eth-status",
    loading: "eth-loading",
    tables: &[
        TableBinding {
            id: "eth-marketStatsTableBody",
            title: "Market Stats",
            columns: &["Metric", "Value"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics { container: "markets", metrics: MARKET_METRICS },
        },
        TableBinding {
            id: "eth-performanceTableBody",
            title: "Performance",
            columns: &["Period", "Change"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics { container: "yields", metrics: PERFORMANCE_METRICS },
        },
        TableBinding {
            id: "eth-topFlowsTableBody",
            title: "Top Flows",
            columns: &["Time", "Input (USD)", "Output (USD)", "Status"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Records { container: "top_flows", columns: TOP_FLOW_COLUMNS },
        },
        TableBinding {
            id: "eth-flowsTableBody",
            title: "Exchange Flows",
            columns: &["Flow", "Amount"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics { container: "", metrics: ETH_FLOW_METRICS },
        },
    ],
    charts: &[
        ChartBinding {
            id: "eth-priceTrendChart",
            title: "Price Trend (USD)",
            kind: ChartKind::Continuous,
            error_slot: "eth-priceTrendError",
            source: SeriesSource::Candles { container: "price_history" },
        },
        ChartBinding {
            id: "eth-feesChart",
            title: "Transaction Fees (USD)",
            kind: ChartKind::Continuous,
            error_slot: "eth-feesError",
            source: SeriesSource::Line {
                container: "fees",
                x: "dates",
                y: "values",
                label: "Transaction Fees",
            },
        },
    ],
    text_slots: &[
        TextBinding {
            id: "eth-lastUpdated",
            label: "Last updated",
            path: "markets.last_updated",
            fmt: Fmt::Timestamp,
            placeholder: None,
            fallback: "Not available",
        },
        TextBinding {
            id: "eth-marketAnalysis",
            label: "Analysis",
            path: "analysis",
            fmt: Fmt::Text,
            placeholder: Some("Fetching analysis..."),
            fallback: "No analysis available",
        },
        TextBinding {
            id: "eth-marketConclusion",
            label: "Conclusion",
            path: "conclusion",
            fmt: Fmt::Text,
            placeholder: Some("Fetching conclusion..."),
            fallback: "No conclusion available",
        },
    ],
    export: ExportLayout {
        title: "Ethereum Price History",
        source: PRICE_HISTORY_EXPORT,
    },
};

static BLACKROCK: SectionBindings = SectionBindings {
    status: "blackrock-status",
    loading: "blackrock-loading",
    tables: &[
        TableBinding {
            id: "blackrock-balancesTableBody",
            title: "Balances",
            columns: &["Token", "Balance", "Value (USD)"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Keyed {
                container: "balances",
                rows: &[
                    KeyedRow {
                        key: "BTC",
                        columns: &[
                            Column { key: "balance", fmt: Fmt::Quantity(8) },
                            Column { key: "balance_usd", fmt: Fmt::Currency },
                        ],
                    },
                    KeyedRow {
                        key: "ETH",
                        columns: &[
                            Column { key: "balance", fmt: Fmt::Quantity(2) },
                            Column { key: "balance_usd", fmt: Fmt::Currency },
                        ],
                    },
                    KeyedRow {
                        key: "USDC",
                        columns: &[
                            Column { key: "balance", fmt: Fmt::Quantity(2) },
                            Column { key: "balance_usd", fmt: Fmt::Currency },
                        ],
                    },
                ],
            },
        },
        TableBinding {
            id: "blackrock-fedCorrelationTableBody",
            title: "FED News Correlation",
            columns: &["Date", "Title", "Sentiment", "Before", "After"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Records {
                container: "fed_news_correlation",
                columns: &[
                    Column { key: "news_date", fmt: Fmt::Timestamp },
                    Column { key: "title", fmt: Fmt::Text },
                    Column { key: "sentiment", fmt: Fmt::Text },
                    Column { key: "before", fmt: Fmt::FlowSummary },
                    Column { key: "after", fmt: Fmt::FlowSummary },
                ],
            },
        },
    ],
    charts: &[ChartBinding {
        id: "blackrock-transactionsChart",
        title: "Transaction Activity (USD)",
        kind: ChartKind::Continuous,
        error_slot: "transactionsChartError",
        source: SeriesSource::DailyFlows { container: "transactions" },
    }],
    text_slots: &[
        TextBinding {
            id: "blackrock-analysis",
            label: "Analysis",
            path: "analysis",
            fmt: Fmt::Text,
            placeholder: None,
            fallback: "No analysis available",
        },
        TextBinding {
            id: "blackrock-conclusion",
            label: "Conclusion",
            path: "conclusion",
            fmt: Fmt::Text,
            placeholder: None,
            fallback: "No conclusion available",
        },
    ],
    export: ExportLayout {
        title: "BlackRock Transactions",
        source: ExportSource::Records {
            container: "transactions",
            columns: &[
                ExportColumn { key: "timestamp", label: "Timestamp", fmt: Fmt::Timestamp },
                ExportColumn { key: "token", label: "Token", fmt: Fmt::Text },
                ExportColumn { key: "type", label: "Type", fmt: Fmt::Text },
                ExportColumn { key: "usd_value", label: "Value (USD)", fmt: Fmt::Currency },
            ],
        },
    },
};

static LIDO: SectionBindings = SectionBindings {
    status: "lido-status",
    loading: "lido-loading",
    tables: &[
        TableBinding {
            id: "lido-poolTableBody",
            title: "stETH Pool",
            columns: &["Metric", "Value"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Metrics {
                container: "markets.stETH",
                metrics: &[
                    Metric { key: "total_eth_deposited", label: "Total Deposited (ETH)", fmt: Fmt::Quantity(2) },
                    Metric { key: "eth_staked", label: "Staked (ETH)", fmt: Fmt::Quantity(2) },
                    Metric { key: "eth_unstaked", label: "Unstaked (ETH)", fmt: Fmt::Quantity(2) },
                    Metric { key: "staking_rewards", label: "Rewards (ETH)", fmt: Fmt::Quantity(8) },
                ],
            },
        },
        TableBinding {
            id: "lido-yieldsTableBody",
            title: "Yields",
            columns: &["Metric", "Value"],
            placeholder: None,
            source: TableSource::Metrics {
                container: "yields",
                metrics: &[Metric { key: "avg_rewards", label: "Average Rewards (%)", fmt: Fmt::Percent }],
            },
        },
        TableBinding {
            id: "lido-queuesTableBody",
            title: "Staking Queues",
            columns: &["Queue", "Amount (ETH)", "Avg Wait (days)"],
            placeholder: Some(FETCHING_ROW),
            source: TableSource::Records {
                container: "analytics.queues",
                columns: &[
                    Column { key: "queue_type", fmt: Fmt::Text },
                    Column { key: "eth_amount", fmt: Fmt::Quantity(2) },
                    Column { key: "avg_wait_time", fmt: Fmt::Quantity(2) },
                ],
            },
        },
    ],
    charts: &[],
    text_slots: &[
        TextBinding {
            id: "lido-stakingRatio",
            label: "Staking ratio",
            path: "analytics.staking_ratio",
            fmt: Fmt::Quantity(4),
            placeholder: None,
            fallback: "Not available",
        },
        TextBinding {
            id: "lido-lastUpdated",
            label: "Last updated",
            path: "markets.stETH.last_updated",
            fmt: Fmt::Timestamp,
            placeholder: None,
            fallback: "Not available",
        },
    ],
    export: ExportLayout {
        title: "Lido Staking Queues",
        source: ExportSource::Records {
            container: "analytics.queues",
            columns: &[
                ExportColumn { key: "queue_type", label: "Queue", fmt: Fmt::Text },
                ExportColumn { key: "eth_amount", label: "Amount (ETH)", fmt: Fmt::Quantity(2) },
                ExportColumn { key: "avg_wait_time", label: "Avg Wait (days)", fmt: Fmt::Quantity(2) },
            ],
        },
    },
};

static BINANCE_POLAR: SectionBindings = SectionBindings {
    status: "binance_polar-status",
    loading: "binance_polar-loading",
    tables: &[TableBinding {
        id: "binance_polar-tableBody",
        title: "Volume x Volatility",
        columns: &["Pair", "Volume (USDT)", "Cum. Delta", "Share"],
        placeholder: Some(FETCHING_ROW),
        source: TableSource::Records {
            container: "",
            columns: &[
                Column { key: "symbol", fmt: Fmt::Text },
                Column { key: "cum_vol", fmt: Fmt::Currency },
                Column { key: "cum_delta", fmt: Fmt::Quantity(4) },
                Column { key: "percent", fmt: Fmt::Percent },
            ],
        },
    }],
    charts: &[ChartBinding {
        id: "binance_polar-chart",
        title: "Share of Volume x Volatility",
        kind: ChartKind::Proportional,
        error_slot: "binance_polar-chartError",
        source: SeriesSource::Shares {
            container: "",
            label: "symbol",
            volume: "cum_vol",
            delta: "cum_delta",
        },
    }],
    text_slots: &[],
    export: ExportLayout {
        title: "Binance Polar Distribution",
        source: ExportSource::Records {
            container: "",
            columns: &[
                ExportColumn { key: "symbol", label: "Pair", fmt: Fmt::Text },
                ExportColumn { key: "cum_vol", label: "Volume (USDT)", fmt: Fmt::Currency },
                ExportColumn { key: "cum_delta", label: "Cum. Delta", fmt: Fmt::Quantity(4) },
                ExportColumn { key: "percent", label: "Share (%)", fmt: Fmt::Percent },
            ],
        },
    },
};

pub fn bindings_for(section: Section) -> &'static SectionBindings {
    match section {
        Section::Bitcoin => &BITCOIN,
        Section::Eth => &ETH,
        Section::Blackrock => &BLACKROCK,
        Section::Lido => &LIDO,
        Section::BinancePolar => &BINANCE_POLAR,
    }
}
