use crate::models::ChatContext;

/// Deterministic rule-based reply, used whenever the completion service is
/// unconfigured or fails. Keyword matching on the user message plus whatever
/// skin type and concerns are already known from context.
pub fn rule_based_reply(message: &str, context: &ChatContext) -> String {
    let message = message.to_lowercase();
    let skin_type = context
        .skin_type
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    let concerns = &context.concerns;

    if message.contains("洁面") || message.contains("cleanser") {
        if skin_type == "oily" {
            "对于油性肌肤，我推荐使用含有水杨酸的泡沫洁面产品。它能有效清洁毛孔，控制油脂分泌。每天早晚使用，注意不要过度清洁。".to_string()
        } else if skin_type == "dry" {
            "干性肌肤建议使用温和的乳状洁面产品，含有神经酰胺和透明质酸的配方能在清洁的同时保持肌肤水分。避免使用含有皂基的洁面产品。".to_string()
        } else {
            "根据您的肤质，我建议使用温和的凝胶状洁面产品。它能平衡肌肤的水油状态，既能清洁T区的油脂，又不会让两颊过于干燥。".to_string()
        }
    } else if message.contains("爽肤水") || message.contains("toner") {
        "爽肤水的选择要根据您的肌肤需求。如果您的肌肤偏油，可以选择含有金缕梅或茶树成分的清爽型爽肤水；如果偏干，建议选择保湿型爽肤水，含有透明质酸或甘油成分。".to_string()
    } else if message.contains("精华") || message.contains("serum") {
        if concerns.iter().any(|c| c == "acne") || message.contains('痘') {
            "针对痘痘问题，我推荐含有烟酰胺或水杨酸的精华液。烟酰胺能帮助调节皮脂分泌，减少炎症；水杨酸则能深入毛孔清洁。建议从低浓度开始使用。".to_string()
        } else if concerns.iter().any(|c| c == "wrinkles")
            || message.contains("细纹")
            || message.contains('抗')
        {
            "对于抗老需求，维A醇（Retinol）精华是黄金成分。它能促进胶原蛋白生成，改善细纹。初次使用建议从低浓度开始，并在晚上使用，白天务必做好防晒。".to_string()
        } else {
            "精华液是护肤中的重要步骤。根据您的肤质，我建议使用保湿精华，含有透明质酸、神经酰胺等成分能深层滋润肌肤。".to_string()
        }
    } else if message.contains("防晒") || message.contains("sunscreen") {
        "防晒是护肤中最重要的步骤！建议选择 SPF 30 以上的广谱防晒产品。如果您的肌肤偏油，可以选择清爽型的化学防晒；如果敏感，物理防晒会更温和。记得每2-3小时补涂一次。".to_string()
    } else if message.contains("顺序") || message.contains("步骤") || message.contains("routine") {
        "正确的护肤顺序是：\n\n早上：\n1. 洁面\n2. 爽肤水\n3. 精华（如维C精华）\n4. 乳液/面霜\n5. 防晒（最重要！）\n\n晚上：\n1. 卸妆（如有化妆）\n2. 洁面\n3. 爽肤水\n4. 精华（如维A醇精华）\n5. 乳液/面霜\n\n记住：从最轻薄的质地用到最厚重的质地。".to_string()
    } else if message.contains("预算") || message.contains("price") || message.contains("便宜") {
        "护肤不一定要买贵的产品！很多平价品牌如 CeraVe、The Ordinary、The Inkey List 都有非常有效的产品。关键是选择适合自己肤质、含有有效成分的产品，并坚持使用。".to_string()
    } else if message.contains("敏感") || message.contains("sensitive") {
        "敏感肌肤需要特别呵护。建议选择无香料、无酒精、经过敏感肌测试的产品。避免使用含有刺激性成分如高浓度果酸、酒精的产品。建议先在耳后做过敏测试再全脸使用。".to_string()
    } else {
        format!(
            "我理解您对'{}'的疑问。基于您的{}肤质，我可以为您提供个性化的护肤建议。请问您具体想了解洁面、保湿、还是其他护肤步骤呢？",
            message, skin_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanser_branch_depends_on_skin_type() {
        let oily = ChatContext {
            skin_type: Some("oily".to_string()),
            ..Default::default()
        };
        let reply = rule_based_reply("推荐一款洁面", &oily);
        assert!(reply.contains("水杨酸"));

        let dry = ChatContext {
            skin_type: Some("dry".to_string()),
            ..Default::default()
        };
        let reply = rule_based_reply("推荐一款洁面", &dry);
        assert!(reply.contains("神经酰胺"));
    }

    #[test]
    fn serum_branch_uses_known_concerns() {
        let context = ChatContext {
            concerns: vec!["acne".to_string()],
            ..Default::default()
        };
        let reply = rule_based_reply("什么精华好用", &context);
        assert!(reply.contains("烟酰胺"));
    }

    #[test]
    fn english_keywords_are_matched_case_insensitively() {
        let reply = rule_based_reply("Which SUNSCREEN should I use?", &ChatContext::default());
        assert!(reply.contains("SPF 30"));
    }

    #[test]
    fn unknown_topic_gets_generic_but_nonempty_reply() {
        let reply = rule_based_reply("随便聊聊", &ChatContext::default());
        assert!(!reply.is_empty());
        assert!(reply.contains("随便聊聊"));
    }

    #[test]
    fn replies_are_deterministic() {
        let context = ChatContext::default();
        assert_eq!(
            rule_based_reply("防晒怎么选", &context),
            rule_based_reply("防晒怎么选", &context)
        );
    }
}
