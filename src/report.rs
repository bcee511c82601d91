//! Markdown analysis brief handed to an external analyst (or an LLM) together
//! with the numbers behind the current dashboard view.

use crate::comparison::{compare, describe_change};
use crate::engine::DashboardSnapshot;
use crate::format::format_kpi_value;
use crate::kpi::KpiKey;
use crate::schema::AnalysisMode;

#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Title of the chart the brief was requested from.
    pub chart_title: String,
    pub current_period_label: String,
    pub compare_period_label: String,
    pub mode: AnalysisMode,
    pub selected_business_types: Vec<String>,
    /// Size of the full business line list, to detect "all lines".
    pub total_business_types: usize,
}

impl ReportContext {
    fn scope(&self) -> String {
        if self.selected_business_types.len() == self.total_business_types {
            "全部业务".to_string()
        } else {
            self.selected_business_types.join(", ")
        }
    }
}

pub fn kpi_summary_table(snapshot: &DashboardSnapshot) -> String {
    let current = &snapshot.summary.current.kpis;
    let previous = &snapshot.summary.compare.kpis;

    let mut table = String::from("| 指标 | 当前周期 | 对比周期 | 变化 |\n|:---|---:|---:|---:|\n");
    for key in KpiKey::ALL {
        let definition = key.definition();
        let (cur, prev) = (current.get(key), previous.get(key));
        let change: String = describe_change(&compare(key, cur, prev))
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            definition.name,
            format_kpi_value(cur, definition.unit, false),
            format_kpi_value(prev, definition.unit, false),
            change
        ));
    }
    table
}

pub fn business_line_table(snapshot: &DashboardSnapshot) -> String {
    let names: Vec<&str> = KpiKey::ALL.iter().map(|k| k.definition().name).collect();
    let mut table = format!(
        "| 业务线 | {} |\n|:---|{}\n",
        names.join(" | "),
        "---:|".repeat(names.len())
    );

    for line in &snapshot.by_business_type {
        let values: Vec<String> = KpiKey::ALL
            .iter()
            .map(|k| format_kpi_value(line.kpis.get(*k), k.unit(), false))
            .collect();
        table.push_str(&format!(
            "| {} | {} |\n",
            line.record.business_type,
            values.join(" | ")
        ));
    }
    table
}

pub fn generate_analysis_brief(context: &ReportContext, snapshot: &DashboardSnapshot) -> String {
    format!(
        r#"# 车险经营分析报告请求

## 1. 分析背景

- **当前周期**: {current}
- **对比周期**: {compare}
- **分析模式**: {mode}
- **分析范围**: {scope}

## 2. 核心指标看板 (KPIs)

{kpi_table}
## 3. 当前图表详细数据

"{chart}" 图表使用的业务线明细：

{line_table}
## 4. 分析要求

1. **总体表现**: 概括当前周期的经营状况，指出主要亮点与风险点。
2. **指标归因**: 解释关键指标的变化来源，例如边际贡献率下降是由满期赔付率还是费用率上升导致。
3. **业务线评估**: 找出表现最好与最差的业务线，并从赔付率、费用率、出险率等维度诊断原因。
4. **改进建议**: 提出 3-5 条具体可执行的经营建议。
"#,
        current = context.current_period_label,
        compare = context.compare_period_label,
        mode = context.mode.display_name(),
        scope = context.scope(),
        kpi_table = kpi_summary_table(snapshot),
        chart = context.chart_title,
        line_table = business_line_table(snapshot),
    )
}
