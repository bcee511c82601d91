use insurance_kpi_dashboard::*;
use std::env;
use std::fs::File;

const BUNDLED_CSV: &str = "\
period_id,period_label,business_type,premium_written,premium_earned,total_loss_amount,expense_amount_raw,claim_count,avg_premium_per_policy,avg_commercial_index
2024-W24,2024年第24周,交强险,9800,6100,3900,1150,7600,948,
2024-W24,2024年第24周,车损险,18200,11400,6800,4010,13100,2610,0.86
2024-W24,2024年第24周,新能源车险,7300,4600,3400,1310,6500,4090,0.95
2024-W25,2024年第25周,交强险,10230,6500,4150,1200,7980,951,
2024-W25,2024年第25周,车损险,18990,12200,7250,4180,13940,2605,0.86
2024-W25,2024年第25周,新能源车险,7610,4930,3660,1370,7020,4102,0.95
2024-W26,2024年第26周,交强险,10650,6900,4400,1250,8370,949,
2024-W26,2024年第26周,车损险,19770,13000,7700,4350,14800,2598,0.86
2024-W26,2024年第26周,新能源车险,7920,5270,3950,1430,7560,4110,0.95
";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // pass a CSV path to load your own export
    let store = match env::args().nth(1) {
        Some(path) => {
            println!("Loading {}", path);
            InMemoryStore::from_csv(File::open(path)?)?
        }
        None => InMemoryStore::from_csv(BUNDLED_CSV.as_bytes())?,
    };
    println!("Loaded {} periods\n", store.period_count());

    let service = DashboardService::new(store);
    let view = service.load(&DashboardRequest {
        mode: AnalysisMode::Pop,
        ..DashboardRequest::default()
    })?;

    println!("{}", kpi_summary_table(&view.snapshot));
    println!("{}", business_line_table(&view.snapshot));

    let options = service.filter_options();
    let context = ReportContext {
        chart_title: "业务线变动成本率".to_string(),
        current_period_label: options
            .period_label(&view.request.current_period)
            .unwrap_or_default()
            .to_string(),
        compare_period_label: options
            .periods_before(&view.request.current_period)
            .first()
            .and_then(|id| options.period_label(id))
            .unwrap_or_default()
            .to_string(),
        mode: view.request.mode,
        selected_business_types: view.request.selected_business_types.clone(),
        total_business_types: options.business_types.len(),
    };
    println!("{}", generate_analysis_brief(&context, &view.snapshot));

    println!("Request schema:");
    println!("{}", serde_json::to_string_pretty(&DashboardRequest::generate_json_schema())?);

    Ok(())
}
