//! Prompt construction for the generative provider.

use super::GeneratorConfig;
use crate::asset::AssetDescriptor;

/// Build the provider prompt for one asset
pub fn build_prompt(asset: &AssetDescriptor, config: &GeneratorConfig) -> String {
    let purchase_date = asset
        .purchase_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Generate {}-{} specific maintenance recommendations for this asset.\n\n",
        config.min_items, config.max_items
    ));

    prompt.push_str(&format!("Asset: {}\n", asset.display_name()));
    prompt.push_str(&format!("Type: {}\n", asset.asset_type.as_str()));
    prompt.push_str(&format!(
        "Brand: {}\n",
        asset.brand.as_deref().unwrap_or("Generic")
    ));
    prompt.push_str(&format!(
        "Model: {}\n",
        asset.model.as_deref().unwrap_or("Standard")
    ));
    prompt.push_str(&format!("Purchase Date: {}\n\n", purchase_date));

    prompt.push_str(&format!("Context: {}\n\n", config.regional_context));

    prompt.push_str("For each recommendation, provide:\n");
    prompt.push_str("1. title (short, actionable)\n");
    prompt.push_str("2. description (specific to the operating conditions above)\n");
    prompt.push_str("3. priority (HIGH/MEDIUM/LOW)\n");
    prompt.push_str(&format!(
        "4. estimatedCost (a range in {})\n",
        config.currency
    ));
    prompt.push_str("5. timeframe (when to do it)\n");
    prompt.push_str("6. category (PREVENTIVE/ROUTINE/URGENT/SEASONAL)\n\n");

    prompt.push_str("Respond with ONLY a JSON array, for example:\n");
    prompt.push_str(&format!(
        r#"[
  {{
    "title": "Check brake pads",
    "description": "Heavy traffic accelerates brake wear. Check for dust buildup.",
    "priority": "HIGH",
    "estimatedCost": "{c}15,000 - {c}25,000",
    "timeframe": "Within 2 weeks",
    "category": "URGENT"
  }}
]
"#,
        c = config.currency
    ));

    prompt.push_str(&format!(
        "\nMake the recommendations specific to a {} in these operating conditions.\n",
        asset.asset_type.label()
    ));

    prompt
}
