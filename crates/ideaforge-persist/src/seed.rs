use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{
    AppSettings, Assistant, AssistantCategory, OutputFormat, OutputShape, PromptConfig,
};
use crate::repositories::AssistantRepository;

/// Insert the stock assistants on first boot. No-op when any assistant exists.
pub async fn seed_assistants(repo: &AssistantRepository) -> Result<()> {
    if repo.count().await? > 0 {
        tracing::info!("Assistants already seeded");
        return Ok(());
    }

    repo.insert_many(vec![idea_generator(), strategy_advisor()])
        .await?;
    tracing::info!("Assistants seeded successfully");
    Ok(())
}

fn refinement_templates() -> BTreeMap<String, String> {
    let entries = [
        (
            "business-model",
            "You are a bootstrap business expert helping regular people start affordable \
             businesses. Analyze this business idea and provide ONLY the structured format below:\n\n\
             Revenue Streams: simple revenue sources, $50-500/month to start.\n\
             Monthly Costs: keep the total under $200/month (basic tools, hosting, materials).\n\
             Value Proposition: the problem you solve for customers, in plain terms.\n\
             Getting Started: what the owner can do this week with under $100.\n\n\
             Assume a $500-2000 total budget. Show how to start small and grow gradually.",
        ),
        (
            "target-audience",
            "You are a practical market researcher helping small business owners find their first \
             customers. Provide ONLY actionable customer insights:\n\n\
             Ideal Customer: a specific person (age range, income, the exact problem they have).\n\
             Where to Find Them: specific online communities and local places.\n\
             Market Reality: how many people nearby plausibly have this problem.\n\
             First Customers: three specific places to find the first 10 customers this month.",
        ),
        (
            "marketing-strategy",
            "You are a low-budget marketing expert helping bootstrap entrepreneurs. Provide ONLY \
             practical, affordable tactics:\n\n\
             Free Channels: social media, content, networking at $0-50/month.\n\
             First 10 Customers: specific actions for this month.\n\
             Monthly Budget: how to spend $50-200/month effectively.\n\
             Growth Tactics: simple ways to earn referrals and repeat customers.",
        ),
        (
            "financial-planning",
            "You are a bootstrap financial advisor for people starting with small budgets. Provide \
             ONLY realistic numbers:\n\n\
             Startup Costs: total under $1,000.\n\
             Revenue Goals: month 1 at $100-300, month 6 at $500-1500, year 1 at $2000-5000/month.\n\
             Break-even: when monthly costs of $50-200 are covered.\n\
             Growth: how to reinvest profits gradually. No $50K+ projections.",
        ),
        (
            "risk-assessment",
            "You are a practical risk advisor for small business owners. Provide ONLY realistic, \
             actionable risk management:\n\n\
             What Could Go Wrong: the three most likely problems for a business like this.\n\
             Early Warning Signs: red flags in the first 6 months.\n\
             Money Risks: how to avoid losing the $500-2000 investment.\n\
             Simple Protection: three easy steps to take this week.",
        ),
        (
            "technical-requirements",
            "You are a no-code expert helping non-technical entrepreneurs. Provide ONLY simple, \
             affordable tech guidance:\n\n\
             Simple Stack: free or cheap platforms (site builders, storefronts, design tools).\n\
             Launch Timeline: what can be built in 1-4 weeks without coding.\n\
             DIY Approach: step-by-step using existing platforms.\n\
             Tech Costs: $10-100/month for tools and hosting.",
        ),
        (
            "legal-compliance",
            "You are a plain-language legal advisor for small business owners. Provide ONLY basic, \
             practical guidance:\n\n\
             Basic Requirements: licenses obtainable online for under $200.\n\
             Must-Do Steps: three essential legal steps in the first month.\n\
             Business Structure: LLC versus sole proprietorship for this idea.\n\
             Simple Protection: protecting the business name and ideas. Keep legal setup under $500.",
        ),
        (
            "competitive-analysis",
            "You are a practical competitor researcher for small business owners. Provide ONLY \
             actionable competitive insights:\n\n\
             Who You're Up Against: 2-3 local or online competitors doing similar things.\n\
             What Customers Do Instead: cheap alternatives they might choose.\n\
             Your Edge: simple ways to be better, different, or cheaper.\n\
             Standing Out: positioning as the obvious choice.",
        ),
        (
            "revenue-streams",
            "You are a practical pricing expert helping small businesses earn from day one. Provide \
             ONLY simple revenue advice:\n\n\
             How You Make Money: the main service or product at $25-200 per transaction.\n\
             Extra Income: 2-3 simple add-ons that raise the average sale.\n\
             Pricing That Works: start low for the first customers, raise as quality improves.\n\
             Growing Revenue: the path from $500/month to $2000/month in 6 months.",
        ),
        (
            "operational-planning",
            "You are a solo-entrepreneur operations expert. Provide ONLY practical daily-operation \
             advice:\n\n\
             Daily Routine: the 2-4 hours of core work each day.\n\
             Just You, For Now: handling everything solo until $2000/month.\n\
             Simple Systems: basic tools to stay organized.\n\
             Working Smarter: three ways to save time and avoid burnout.",
        ),
        (
            "growth-strategy",
            "You are a bootstrap growth expert helping small businesses grow from $500 to \
             $5000/month. Provide ONLY realistic growth advice:\n\n\
             Next Steps: three simple ways to double revenue in 6 months.\n\
             What to Track: three key numbers to watch weekly.\n\
             Scaling Up: when and how to hire the first helper.\n\
             Timeline: month-by-month goals for the next 12 months.",
        ),
        (
            "partnerships",
            "You are a local networking expert helping small business owners find simple \
             partnerships. Provide ONLY practical partnership advice:\n\n\
             Easy Partners: 2-3 local businesses to partner with.\n\
             Referrals: simple ways to send customers to each other.\n\
             Local Networking: where to meet potential partners.\n\
             Simple Agreements: basic collaboration ideas that help both sides.",
        ),
        (
            "market-entry",
            "You are a launch expert helping people start their business in the next 30 days. \
             Provide ONLY immediate action steps:\n\n\
             Launch Plan: what to do in weeks 1 through 4.\n\
             30-Day Timeline: specific tasks with deadlines.\n\
             First Customers: getting the first 5 customers in month 1.\n\
             Getting Started: the three biggest hurdles and their simple fixes.",
        ),
    ];

    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn idea_generator() -> Assistant {
    let refinement_templates = refinement_templates();
    let refinement_options = refinement_templates.keys().cloned().collect::<Vec<_>>();

    Assistant {
        id: ObjectId::new(),
        name: "Idea Generator Pro".to_string(),
        category: AssistantCategory::Idea,
        description: "AI-powered business idea generator for any industry".to_string(),
        system_prompt: "You are an expert business consultant specializing in innovative idea \
                        generation."
            .to_string(),
        is_active: true,
        app_type: "idea-generator".to_string(),
        prompt_config: PromptConfig {
            system_template: "You are a bootstrap business expert helping regular people start \
                              affordable, realistic businesses.\n\
                              Generate exactly {{count}} practical business ideas for the \
                              {{industry}} space that can be started with a $500-2000 budget.\n\
                              Each idea must be immediately actionable, require minimal startup \
                              costs, and generate income within 30-90 days.\n\
                              Focus on simple businesses that solve real problems without complex \
                              technology or large investments.\n\n\
                              Return the response as a valid JSON array with this exact structure:\n\
                              [\n  {\n    \"title\": \"string\",\n    \"description\": \"string \
                              (2-3 sentences explaining what you do and how you make money)\",\n    \
                              \"score\": number\n  }\n]"
                .to_string(),
            user_template: "Based on this interest: \"{{input}}\", generate {{count}} realistic \
                            business ideas that:\n\
                            1. Can be started this month with under $1000\n\
                            2. Use simple tools anyone can learn (no coding required)\n\
                            3. Generate the first $100-500 within 60 days\n\
                            4. Require 10-20 hours per week to start\n\
                            5. Solve everyday problems people actually pay for\n\n\
                            Generate practical ideas now:"
                .to_string(),
            refinement_templates,
            parameter_inference_prompt: Some(
                "Extract key generation parameters from this message: \"{{message}}\". Only \
                 extract parameters that are explicitly mentioned. Return JSON with industry, \
                 count, complexity, tone, target_audience, urgency, budget_range fields; omit \
                 any field that is not mentioned."
                    .to_string(),
            ),
        },
        output_format: OutputFormat {
            shape: OutputShape::Array,
            structure: json!({
                "title": "string",
                "description": "string",
                "score": "number",
            }),
        },
        app_settings: AppSettings {
            default_count: Some(6),
            default_industry: Some("general".to_string()),
            default_complexity: None,
            default_format: Some("cards".to_string()),
            default_options: serde_json::Map::new(),
            refinement_options,
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn strategy_advisor() -> Assistant {
    Assistant {
        id: ObjectId::new(),
        name: "Strategy Advisor".to_string(),
        category: AssistantCategory::Strategy,
        description: "Provides strategic business guidance".to_string(),
        system_prompt: "You are a strategic business advisor who helps companies develop \
                        comprehensive business strategies and roadmaps."
            .to_string(),
        is_active: true,
        app_type: "strategy-advisor".to_string(),
        prompt_config: PromptConfig {
            system_template: "You are a strategic business advisor. Provide comprehensive \
                              strategic guidance."
                .to_string(),
            user_template: "Analyze and provide strategic business advice for: {{input}}\n\n\
                            Focus on business strategy, market analysis, competitive positioning, \
                            growth opportunities, and operational excellence."
                .to_string(),
            refinement_templates: BTreeMap::new(),
            parameter_inference_prompt: None,
        },
        output_format: OutputFormat {
            shape: OutputShape::Object,
            structure: json!({
                "analysis": "string",
                "recommendations": "array",
                "risks": "array",
            }),
        },
        app_settings: AppSettings {
            default_count: None,
            default_industry: None,
            default_complexity: None,
            default_format: None,
            default_options: serde_json::Map::new(),
            refinement_options: Vec::new(),
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idea_generator_exposes_all_refinement_aspects() {
        let assistant = idea_generator();
        assert_eq!(assistant.app_settings.refinement_options.len(), 13);
        for aspect in &assistant.app_settings.refinement_options {
            assert!(
                assistant
                    .prompt_config
                    .refinement_templates
                    .contains_key(aspect),
                "aspect {aspect} has no template"
            );
        }
    }

    #[test]
    fn test_seeded_templates_carry_placeholders() {
        let assistant = idea_generator();
        assert!(assistant
            .prompt_config
            .system_template
            .contains("{{count}}"));
        assert!(assistant.prompt_config.user_template.contains("{{input}}"));
        assert!(assistant
            .prompt_config
            .parameter_inference_prompt
            .as_deref()
            .unwrap()
            .contains("{{message}}"));
    }

    #[test]
    fn test_strategy_advisor_is_object_shaped() {
        let assistant = strategy_advisor();
        assert_eq!(assistant.output_format.shape, OutputShape::Object);
        assert!(assistant.app_settings.refinement_options.is_empty());
    }
}
