use crate::models::{DisplayInfo, Intent};

const MARKET: DisplayInfo = DisplayInfo {
    icon: "shopping-bag",
    label_key: "search.intent.market",
    color_class: "text-amber-700 bg-amber-50",
};

const DATA: DisplayInfo = DisplayInfo {
    icon: "bar-chart-3",
    label_key: "search.intent.data",
    color_class: "text-sky-700 bg-sky-50",
};

const SECTOR: DisplayInfo = DisplayInfo {
    icon: "factory",
    label_key: "search.intent.sector",
    color_class: "text-emerald-700 bg-emerald-50",
};

const AI: DisplayInfo = DisplayInfo {
    icon: "sparkles",
    label_key: "search.intent.ai",
    color_class: "text-violet-700 bg-violet-50",
};

// Shares the data label.
const FALLBACK: DisplayInfo = DisplayInfo {
    icon: "search",
    label_key: DATA.label_key,
    color_class: "text-slate-600 bg-slate-50",
};

pub fn display_for(intent: Intent) -> DisplayInfo {
    match intent {
        Intent::Market => MARKET,
        Intent::Data => DATA,
        Intent::Sector => SECTOR,
        Intent::Ai => AI,
        Intent::Fallback => FALLBACK,
    }
}
