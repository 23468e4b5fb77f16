//! Agent Prompt Templates
//!
//! Pure prompt builders, one per agent kind. Each takes only the task data
//! and returns the user prompt; the system prompt comes from the stored
//! agent profile. Prompts instruct the model to answer with a single JSON
//! object so the output processor can carve it back out.

use crate::models::task::Task;

use super::AgentKind;

/// Build the user prompt for the given agent kind and task. Pure function
/// of the task fields; performs no I/O.
pub fn build_prompt(kind: AgentKind, task: &Task) -> String {
    match kind {
        AgentKind::ContentWriter => content_writer_prompt(task),
        AgentKind::SeoSpecialist => seo_specialist_prompt(task),
        AgentKind::ProductManager => product_manager_prompt(task),
        AgentKind::MarketingCopy => marketing_copy_prompt(task),
    }
}

fn description(task: &Task) -> &str {
    task.description.as_deref().unwrap_or("")
}

fn content_writer_prompt(task: &Task) -> String {
    format!(
        "Tvůj úkol je vytvořit obsah pro Calor.\n\
         \n\
         METADATA:\n\
         - Titulek: {title}\n\
         - Kategorie: {category}\n\
         - Popis: {description}\n\
         - Tagy: {tags}\n\
         \n\
         POKYNY:\n\
         1. Vytvoř obsah v češtině\n\
         2. Zaměř se na Calor - tepelná čerpadla a fotovoltaiku\n\
         3. Zahrň SEO best practices\n\
         4. Struktura: Intro -> Sekce -> Závěr\n\
         5. Vrať validní JSON odpověď\n\
         \n\
         VÝSTUP (JSON):\n\
         {{\n\
           \"title\": \"...\",\n\
           \"meta_description\": \"...\",\n\
           \"content\": {{\n\
             \"intro\": \"...\",\n\
             \"sections\": [\n\
               {{\"heading\": \"...\", \"text\": \"...\"}}\n\
             ],\n\
             \"conclusion\": \"...\"\n\
           }},\n\
           \"seo_keywords\": [\"...\"],\n\
           \"quality_score\": 0.85\n\
         }}",
        title = task.title,
        category = task.category,
        description = description(task),
        tags = task.tags.join(", "),
    )
}

fn seo_specialist_prompt(task: &Task) -> String {
    format!(
        "Jsi SEO expert. Vyoptimalizuj obsah pro Calor.\n\
         \n\
         OBSAH:\n\
         - Titulek: {title}\n\
         - Popis: {description}\n\
         - Cílová klíčová slova: {tags}\n\
         \n\
         POKYNY:\n\
         1. Zjisti vhodná klíčová slova pro český trh\n\
         2. Vytvoř meta tagy (title, description, h1, h2)\n\
         3. Doporuč interní odkazy\n\
         4. Vrať strukturovaný JSON\n\
         \n\
         VÝSTUP (JSON):\n\
         {{\n\
           \"meta_title\": \"...\",\n\
           \"meta_description\": \"...\",\n\
           \"h1\": \"...\",\n\
           \"h2_sections\": [\"...\", \"...\"],\n\
           \"keywords\": {{\"primary\": \"...\", \"secondary\": [\"...\", \"...\"]}},\n\
           \"internal_links\": [\n\
             {{\"anchor\": \"...\", \"url\": \"/...\"}}\n\
           ],\n\
           \"quality_score\": 0.9\n\
         }}",
        title = task.title,
        description = description(task),
        tags = task.tags.join(", "),
    )
}

fn product_manager_prompt(task: &Task) -> String {
    format!(
        "Jsi produktový manažer pro Calor.\n\
         \n\
         PRODUKT:\n\
         - Název: {title}\n\
         - Kategorie: {category}\n\
         - Popis: {description}\n\
         \n\
         POKYNY:\n\
         1. Vytvoř profesionální popis produktu\n\
         2. Zvýrazni benefity a výhody\n\
         3. Zahrň technické specifikace\n\
         4. Vrať JSON odpověď\n\
         \n\
         VÝSTUP (JSON):\n\
         {{\n\
           \"product_name\": \"...\",\n\
           \"short_description\": \"...\",\n\
           \"long_description\": \"...\",\n\
           \"key_features\": [\"...\", \"...\"],\n\
           \"benefits\": [\"...\", \"...\"],\n\
           \"technical_specs\": {{\"spec\": \"value\"}},\n\
           \"target_audience\": \"...\",\n\
           \"quality_score\": 0.9\n\
         }}",
        title = task.title,
        category = task.category,
        description = description(task),
    )
}

fn marketing_copy_prompt(task: &Task) -> String {
    format!(
        "Jsi conversion copywriter pro Calor.\n\
         \n\
         ÚKOL:\n\
         - Titulek: {title}\n\
         - Popis: {description}\n\
         - Tagy: {tags}\n\
         \n\
         POKYNY:\n\
         1. Napiš persuasivní kopii zaměřenou na konverze\n\
         2. Zahrň silné CTA (Call-to-Action)\n\
         3. Zdůrazni benefity a value proposition\n\
         4. Piš emocionálně a přesvědčivě\n\
         5. Vrať JSON odpověď\n\
         \n\
         VÝSTUP (JSON):\n\
         {{\n\
           \"headline\": \"...\",\n\
           \"subheadline\": \"...\",\n\
           \"body_copy\": \"...\",\n\
           \"value_propositions\": [\"...\", \"...\"],\n\
           \"cta_primary\": \"...\",\n\
           \"cta_secondary\": \"...\",\n\
           \"social_proof\": \"...\",\n\
           \"quality_score\": 0.9\n\
         }}",
        title = task.title,
        description = description(task),
        tags = task.tags.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskCategory;

    #[test]
    fn test_prompts_embed_task_fields() {
        let task = Task::new("Tepelné čerpadlo EcoAir", TaskCategory::Product, 1)
            .with_description("Popis produktové řady");

        for kind in AgentKind::all() {
            let prompt = build_prompt(kind, &task);
            assert!(prompt.contains("Tepelné čerpadlo EcoAir"), "{:?}", kind);
            assert!(prompt.contains("VÝSTUP (JSON)"), "{:?}", kind);
        }
    }

    #[test]
    fn test_prompt_is_pure() {
        let task = Task::new("t", TaskCategory::Content, 1);
        assert_eq!(
            build_prompt(AgentKind::ContentWriter, &task),
            build_prompt(AgentKind::ContentWriter, &task)
        );
    }
}
