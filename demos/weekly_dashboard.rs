use chrono::NaiveDate;
use insurance_kpi_dashboard::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("📊 Weekly Auto Insurance Dashboard\n");

    let end = NaiveDate::from_ymd_opt(2024, 6, 26).unwrap();
    let rows = generate_sample_book(&SampleBookConfig::new(end, 26))?;
    let service = DashboardService::new(InMemoryStore::from_records(rows)?);
    let options = service.filter_options();

    println!("Periods available: {}", options.periods.len());
    println!("Business lines: {}\n", options.business_types.join(", "));

    for mode in [AnalysisMode::Ytd, AnalysisMode::Pop, AnalysisMode::Comparison] {
        let view = service.load(&DashboardRequest {
            mode,
            compare_period: "2024-W13".to_string(),
            ..DashboardRequest::default()
        })?;

        let compare_label = match mode {
            AnalysisMode::Comparison => options.period_label(&view.request.compare_period),
            _ => options
                .periods_before(&view.request.current_period)
                .first()
                .and_then(|id| options.period_label(id)),
        };

        println!(
            "== {} | {} vs {} ==",
            mode.display_name(),
            options.period_label(&view.request.current_period).unwrap_or("-"),
            compare_label.unwrap_or("-")
        );
        for card in KpiDashboard::summary_comparisons(&view.snapshot) {
            let definition = card.key.definition();
            println!(
                "  {:<8} {:>14}  {}",
                definition.name,
                format_kpi_value(card.current, definition.unit, true),
                describe_change(&card.result)
            );
        }
        println!();
    }

    let view = service.load(&DashboardRequest::default())?;

    println!("📋 Business lines by variable cost ratio:");
    let mut lines = view.snapshot.by_business_type.clone();
    sort_lines(
        &mut lines,
        SortColumn::Kpi(KpiKey::VariableCostRatio),
        SortDirection::Descending,
    );
    for line in &lines {
        let vcr = line.kpis.variable_cost_ratio;
        println!(
            "  {:<6} VCR {:>7}  {:?}  {}",
            line.record.business_type,
            format_kpi_value(vcr, KpiUnit::Percent, false),
            RiskBand::classify(vcr),
            vcr_color(vcr)
        );
    }

    println!("\n📈 Premium pareto:");
    for entry in pareto(&view.snapshot.by_business_type, KpiKey::PremiumWritten) {
        println!(
            "  {:<6} {:>10} 万元  cumulative {:>6}",
            entry.business_type,
            format_kpi_value(entry.value, KpiUnit::WanYuan, false),
            format_kpi_value(entry.cumulative_percentage, KpiUnit::Percent, false)
        );
    }

    println!("\n📉 Trend (weekly movement as a share of YTD):");
    let contributions = contribution_series(&view.trend, KpiKey::PremiumWritten, KpiKey::ClaimCount);
    for (point, contribution) in view.trend.iter().zip(&contributions) {
        println!(
            "  {}  premium {:>8} 万元 ({})  claims {:>6} ({})  loss ratio {}",
            point.period_label,
            format_kpi_value(point.pop_kpis.premium_written, KpiUnit::WanYuan, false),
            format_kpi_value(contribution.first_share, KpiUnit::Percent, false),
            format_kpi_value(point.pop_kpis.claim_count, KpiUnit::Count, false),
            format_kpi_value(contribution.second_share, KpiUnit::Percent, false),
            format_kpi_value(point.ytd_kpis.loss_ratio, KpiUnit::Percent, false)
        );
    }

    Ok(())
}
