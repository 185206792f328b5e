/// Technologies offered as completions for partially typed stack entries.
const KNOWN_TECH: &[&str] = &[
    "react", "vue", "angular", "nextjs", "nuxt", "svelte", "solid",
    "typescript", "javascript", "python", "java", "csharp", "golang", "rust",
    "tailwind", "bootstrap", "material-ui", "ant-design", "chakra-ui", "bulma",
    "css", "scss", "styled-components", "emotion",
    "nodejs", "express", "fastapi", "django", "flask", "nestjs",
    "mongodb", "postgresql", "mysql", "redis", "sqlite",
    "graphql", "rest", "api", "websocket",
    "docker", "kubernetes", "aws", "azure", "gcp",
    "jest", "vitest", "cypress", "playwright",
    "webpack", "vite", "rollup", "esbuild",
    "prisma", "drizzle", "sequelize", "typeorm",
    "payloadcms", "strapi", "sanity", "contentful", "wordpress", "shopify", "gatsby",
];

/// Split comma-separated entries, trim, lowercase, and drop duplicates
/// while keeping first-seen order.
pub fn normalize<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        for part in entry.as_ref().split(',') {
            let tech = part.trim().to_lowercase();
            if !tech.is_empty() && !out.contains(&tech) {
                out.push(tech);
            }
        }
    }
    out
}

/// First known technology starting with `prefix` that is not already chosen.
pub fn suggest(prefix: &str, chosen: &[String]) -> Option<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return None;
    }
    KNOWN_TECH
        .iter()
        .copied()
        .find(|t| t.starts_with(&prefix) && !chosen.iter().any(|c| c == t))
}

/// Entries that look like an unfinished known technology, with the completion.
pub fn hints(stack: &[String]) -> Vec<(String, &'static str)> {
    stack
        .iter()
        .filter(|s| !KNOWN_TECH.contains(&s.as_str()))
        .filter_map(|s| suggest(s, stack).filter(|t| *t != s.as_str()).map(|t| (s.clone(), t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_splits_trims_and_dedupes() {
        let got = normalize(&["React, TypeScript", " react ", "", "tailwind,,"]);
        assert_eq!(got, vec!["react", "typescript", "tailwind"]);
    }

    #[test]
    fn suggest_skips_already_chosen() {
        assert_eq!(suggest("re", &[]), Some("react"));
        assert_eq!(suggest("re", &["react".to_string()]), Some("redis"));
        assert_eq!(suggest("", &[]), None);
        assert_eq!(suggest("zzz", &[]), None);
    }

    #[test]
    fn hints_only_for_unknown_prefixes() {
        let stack = normalize(&["nex", "rust", "my-internal-lib"]);
        assert_eq!(hints(&stack), vec![("nex".to_string(), "nextjs")]);
    }
}
