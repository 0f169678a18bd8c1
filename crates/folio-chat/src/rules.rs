//! Ordered keyword rule table and the first-match matcher.
//!
//! A message matches a rule when its lower-cased text *contains* any of the
//! rule's trigger fragments. This is plain substring containment, so a short
//! trigger also fires inside longer words ("hi" inside "history", "db"
//! inside "adbdomen"). That behaviour is kept on purpose for compatibility
//! with the authored tables; keep triggers specific enough to live with it.
//!
//! Rules are checked in authored order and the first hit wins. Reordering a
//! table changes the reply for any message that hits more than one rule.

use folio_core::config::RuleConfig;

use crate::error::ChatError;

/// Reply used by the built-in table when no rule matches.
pub const DEFAULT_RESPONSE: &str = "That's a great question! Based on Mir's experience as a Backend Engineer with 3+ years in Node.js, AWS, and distributed systems, I can help you learn more about his technical skills, projects, or achievements. Could you be more specific about what you'd like to know?";

// =============================================================================
// ResponseRule
// =============================================================================

/// One `(triggers, response)` entry of a rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRule {
    triggers: Vec<String>,
    response: String,
}

impl ResponseRule {
    /// Build a rule, lower-casing every trigger.
    ///
    /// Fails if there are no triggers, any trigger is blank, or the response
    /// is blank. A blank trigger would match every message.
    pub fn new<I, S>(triggers: I, response: impl Into<String>) -> Result<Self, ChatError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lowered = Vec::new();
        for trigger in triggers {
            let trigger = trigger.as_ref();
            if trigger.trim().is_empty() {
                return Err(ChatError::InvalidRule(
                    "trigger must not be blank".to_string(),
                ));
            }
            lowered.push(trigger.to_lowercase());
        }
        if lowered.is_empty() {
            return Err(ChatError::InvalidRule(
                "rule must have at least one trigger".to_string(),
            ));
        }

        let response = response.into();
        if response.trim().is_empty() {
            return Err(ChatError::InvalidRule(
                "response must not be blank".to_string(),
            ));
        }

        Ok(Self {
            triggers: lowered,
            response,
        })
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    /// Whether an already lower-cased message contains any trigger.
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t.as_str()))
    }
}

// =============================================================================
// RuleTable
// =============================================================================

/// Result of looking a message up in a [`RuleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatch<'a> {
    /// The rule at `index` was the first to match.
    Rule { index: usize, response: &'a str },
    /// Nothing matched; the table's default reply applies.
    Default(&'a str),
}

impl<'a> RuleMatch<'a> {
    pub fn response(&self) -> &'a str {
        match *self {
            RuleMatch::Rule { response, .. } => response,
            RuleMatch::Default(response) => response,
        }
    }
}

/// Immutable, ordered rule table with a default reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<ResponseRule>,
    default_response: String,
}

impl RuleTable {
    /// Create a table. The default reply must not be blank.
    pub fn new(
        rules: Vec<ResponseRule>,
        default_response: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let default_response = default_response.into();
        if default_response.trim().is_empty() {
            return Err(ChatError::InvalidRule(
                "default response must not be blank".to_string(),
            ));
        }
        Ok(Self {
            rules,
            default_response,
        })
    }

    /// Build a table from config entries, reporting the offending position.
    pub fn from_config(
        rules: &[RuleConfig],
        default_response: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| {
                ResponseRule::new(&rule.triggers, rule.response.clone()).map_err(|e| match e {
                    ChatError::InvalidRule(msg) => {
                        ChatError::InvalidRule(format!("rule {}: {}", idx + 1, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules, default_response)
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    pub fn default_response(&self) -> &str {
        &self.default_response
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the first rule matching `message`, case-insensitively.
    pub fn lookup(&self, message: &str) -> RuleMatch<'_> {
        let normalized = message.to_lowercase();
        self.rules
            .iter()
            .position(|rule| rule.matches(&normalized))
            .map(|index| RuleMatch::Rule {
                index,
                response: self.rules[index].response(),
            })
            .unwrap_or(RuleMatch::Default(&self.default_response))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        portfolio_rules()
    }
}

/// The built-in portfolio rule table, in its authored order.
pub fn portfolio_rules() -> RuleTable {
    let authored: Vec<(Vec<&str>, &str)> = vec![
        (
            vec!["experience", "years"],
            "I have 3+ years of professional experience as a Backend Engineer. I've worked at Atomic House, Zithara, and Growpital, progressively taking on more complex challenges. My experience spans from building payment systems processing Rs 100Cr+ to optimizing high-traffic APIs handling 50K+ daily requests.",
        ),
        (
            vec!["aws", "cloud"],
            "I have extensive AWS experience! I've worked with Lambda for serverless functions, DynamoDB for NoSQL storage, EventBridge for event scheduling, SNS/SQS for messaging, API Gateway for REST APIs, and EC2/ECS for compute. At Atomic House, I reduced P95 latency from 180ms to 45ms by migrating to DynamoDB with optimized partition keys.",
        ),
        (
            vec!["database", "db"],
            "I've worked with multiple databases: PostgreSQL for relational data with complex queries, DynamoDB for high-scale NoSQL workloads, MongoDB for flexible document storage, and Redis for caching and pub/sub. I reduced database queries by 70% using Redis caching strategies at Atomic House.",
        ),
        (
            vec!["project"],
            "Some notable projects: (1) Event-Driven Payment System - processed 50K+ transactions supporting Rs 100Cr+ investment volume using AWS SNS/SQS/Lambda. (2) Dynamic Query Builder - processes 100K+ records in <2s with 15+ operators and nested conditions. (3) High-Performance Caching Layer - Redis-based system reducing DB load by 70%. (4) WebSocket Chat - real-time messaging with <200ms latency using Redis Pub/Sub.",
        ),
        (
            vec!["performance", "optimize"],
            "I've achieved significant performance improvements: reduced P95 latency from 180ms to 45ms through DynamoDB migration and query optimization, cut database queries by 70% using strategic Redis caching, and improved API performance by 60% for 50K+ daily requests. I focus on identifying bottlenecks through profiling and implementing targeted optimizations.",
        ),
        (
            vec!["stack", "technologies"],
            "My tech stack: Backend - Node.js, TypeScript, Express, NestJS. Databases - PostgreSQL, DynamoDB, MongoDB, Redis. Cloud - AWS (Lambda, EC2, S3, EventBridge, SNS, SQS). Architecture - Microservices, Event-Driven patterns. I'm always learning and recently added NestJS to my toolkit for building scalable server-side applications.",
        ),
        (
            vec!["event", "async"],
            "I specialize in event-driven architecture! I've built systems using AWS SNS/SQS for asynchronous message processing, EventBridge for scheduled campaigns (500+/month), and implemented idempotent consumers with retry strategies. This architecture pattern is great for decoupling services and handling high-scale workloads reliably.",
        ),
        (
            vec!["contact", "email", "hire"],
            "I'd love to connect! You can reach me at xackfaizu@gmail.com or find me on LinkedIn at linkedin.com/in/kashmirinoodle. I'm also active on GitHub as KashmirianNoodle. Feel free to reach out about opportunities or just to chat about backend architecture!",
        ),
        (
            vec!["hello", "hi", "hey"],
            "Hello! \u{1f44b} I'm an AI assistant that can answer questions about Mir Shafeeq's professional background. I can tell you about his experience, skills, projects, and achievements. What would you like to know?",
        ),
    ];

    let rules = authored
        .into_iter()
        .map(|(triggers, response)| ResponseRule {
            triggers: triggers.into_iter().map(str::to_string).collect(),
            response: response.to_string(),
        })
        .collect();

    RuleTable {
        rules,
        default_response: DEFAULT_RESPONSE.to_string(),
    }
}
