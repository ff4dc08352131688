//! Built-in tables for the REST API v2.

pub(crate) const REST_V2_CANONICAL_PATHS: &[&str] = &[
    "/{entity_type}/{id}/change_tags",
    "/{entity_type}/{id}/tags",
    "/abilities",
    "/abilities/{id}",
    "/addons",
    "/addons/{id}",
    "/alert_grouping_settings",
    "/alert_grouping_settings/{id}",
    "/analytics/metrics/incidents/all",
    "/analytics/metrics/incidents/escalation_policies",
    "/analytics/metrics/incidents/escalation_policies/all",
    "/analytics/metrics/incidents/services",
    "/analytics/metrics/incidents/services/all",
    "/analytics/metrics/incidents/teams",
    "/analytics/metrics/incidents/teams/all",
    "/analytics/metrics/pd_advance_usage/features",
    "/analytics/metrics/responders/all",
    "/analytics/metrics/responders/teams",
    "/analytics/raw/incidents",
    "/analytics/raw/incidents/{id}",
    "/analytics/raw/incidents/{id}/responses",
    "/analytics/raw/responders/{responder_id}/incidents",
    "/audit/records",
    "/automation_actions/actions",
    "/automation_actions/actions/{id}",
    "/automation_actions/actions/{id}/invocations",
    "/automation_actions/actions/{id}/services",
    "/automation_actions/actions/{id}/services/{service_id}",
    "/automation_actions/actions/{id}/teams",
    "/automation_actions/actions/{id}/teams/{team_id}",
    "/automation_actions/invocations",
    "/automation_actions/invocations/{id}",
    "/automation_actions/runners",
    "/automation_actions/runners/{id}",
    "/automation_actions/runners/{id}/teams",
    "/automation_actions/runners/{id}/teams/{team_id}",
    "/business_services",
    "/business_services/{id}",
    "/business_services/{id}/account_subscription",
    "/business_services/{id}/subscribers",
    "/business_services/{id}/supporting_services/impacts",
    "/business_services/{id}/unsubscribe",
    "/business_services/impactors",
    "/business_services/impacts",
    "/business_services/priority_thresholds",
    "/change_events",
    "/change_events/{id}",
    "/escalation_policies",
    "/escalation_policies/{id}",
    "/escalation_policies/{id}/audit/records",
    "/event_orchestrations",
    "/event_orchestrations/{id}",
    "/event_orchestrations/{id}/integrations",
    "/event_orchestrations/{id}/integrations/{integration_id}",
    "/event_orchestrations/{id}/integrations/migration",
    "/event_orchestrations/{id}/global",
    "/event_orchestrations/{id}/router",
    "/event_orchestrations/{id}/unrouted",
    "/event_orchestrations/services/{service_id}",
    "/event_orchestrations/services/{service_id}/active",
    "/event_orchestrations/{id}/cache_variables",
    "/event_orchestrations/{id}/cache_variables/{cache_variable_id}",
    "/event_orchestrations/services/{service_id}/cache_variables",
    "/event_orchestrations/services/{service_id}/cache_variables/{cache_variable_id}",
    "/extension_schemas",
    "/extension_schemas/{id}",
    "/extensions",
    "/extensions/{id}",
    "/extensions/{id}/enable",
    "/incident_workflows",
    "/incident_workflows/{id}",
    "/incident_workflows/{id}/instances",
    "/incident_workflows/actions",
    "/incident_workflows/actions/{id}",
    "/incident_workflows/triggers",
    "/incident_workflows/triggers/{id}",
    "/incident_workflows/triggers/{id}/services",
    "/incident_workflows/triggers/{trigger_id}/services/{service_id}",
    "/incidents",
    "/incidents/{id}",
    "/incidents/{id}/alerts",
    "/incidents/{id}/alerts/{alert_id}",
    "/incidents/{id}/business_services/{business_service_id}/impacts",
    "/incidents/{id}/business_services/impacts",
    "/incidents/{id}/custom_fields/values",
    "/incidents/{id}/log_entries",
    "/incidents/{id}/merge",
    "/incidents/{id}/notes",
    "/incidents/{id}/outlier_incident",
    "/incidents/{id}/past_incidents",
    "/incidents/{id}/related_change_events",
    "/incidents/{id}/related_incidents",
    "/incidents/{id}/responder_requests",
    "/incidents/{id}/snooze",
    "/incidents/{id}/status_updates",
    "/incidents/{id}/status_updates/subscribers",
    "/incidents/{id}/status_updates/unsubscribe",
    "/incidents/count",
    "/incidents/custom_fields",
    "/incidents/custom_fields/{field_id}",
    "/incidents/custom_fields/{field_id}/field_options",
    "/incidents/custom_fields/{field_id}/field_options/{field_option_id}",
    "/license_allocations",
    "/licenses",
    "/log_entries",
    "/log_entries/{id}",
    "/log_entries/{id}/channel",
    "/maintenance_windows",
    "/maintenance_windows/{id}",
    "/notifications",
    "/oauth_delegations",
    "/oauth_delegations/revocation_requests/status",
    "/oncalls",
    "/paused_incident_reports/alerts",
    "/paused_incident_reports/counts",
    "/priorities",
    "/response_plays",
    "/response_plays/{id}",
    "/response_plays/{response_play_id}/run",
    "/rulesets",
    "/rulesets/{id}",
    "/rulesets/{id}/rules",
    "/rulesets/{id}/rules/{rule_id}",
    "/schedules",
    "/schedules/{id}",
    "/schedules/{id}/audit/records",
    "/schedules/{id}/overrides",
    "/schedules/{id}/overrides/{override_id}",
    "/schedules/{id}/users",
    "/schedules/preview",
    "/service_dependencies/associate",
    "/service_dependencies/business_services/{id}",
    "/service_dependencies/disassociate",
    "/service_dependencies/technical_services/{id}",
    "/services",
    "/services/{id}",
    "/services/{id}/audit/records",
    "/services/{id}/change_events",
    "/services/{id}/integrations",
    "/services/{id}/integrations/{integration_id}",
    "/services/{id}/rules",
    "/services/{id}/rules/convert",
    "/services/{id}/rules/{rule_id}",
    "/standards",
    "/standards/{id}",
    "/standards/scores/{resource_type}",
    "/standards/scores/{resource_type}/{id}",
    "/status_dashboards",
    "/status_dashboards/{id}",
    "/status_dashboards/{id}/service_impacts",
    "/status_dashboards/url_slugs/{url_slug}",
    "/status_dashboards/url_slugs/{url_slug}/service_impacts",
    "/status_pages",
    "/status_pages/{id}/impacts",
    "/status_pages/{id}/impacts/{impact_id}",
    "/status_pages/{id}/services",
    "/status_pages/{id}/services/{service_id}",
    "/status_pages/{id}/severities",
    "/status_pages/{id}/severities/{severity_id}",
    "/status_pages/{id}/statuses",
    "/status_pages/{id}/statuses/{status_id}",
    "/status_pages/{id}/posts",
    "/status_pages/{id}/posts/{post_id}",
    "/status_pages/{id}/posts/{post_id}/post_updates",
    "/status_pages/{id}/posts/{post_id}/post_updates/{post_update_id}",
    "/status_pages/{id}/posts/{post_id}/postmortem",
    "/status_pages/{id}/subscriptions",
    "/status_pages/{id}/subscriptions/{subscription_id}",
    "/tags",
    "/tags/{id}",
    "/tags/{id}/users",
    "/tags/{id}/teams",
    "/tags/{id}/escalation_policies",
    "/teams",
    "/teams/{id}",
    "/teams/{id}/audit/records",
    "/teams/{id}/escalation_policies/{escalation_policy_id}",
    "/teams/{id}/members",
    "/teams/{id}/notification_subscriptions",
    "/teams/{id}/notification_subscriptions/unsubscribe",
    "/teams/{id}/users/{user_id}",
    "/templates",
    "/templates/{id}",
    "/templates/{id}/render",
    "/templates/fields",
    "/users",
    "/users/{id}",
    "/users/{id}/audit/records",
    "/users/{id}/contact_methods",
    "/users/{id}/contact_methods/{contact_method_id}",
    "/users/{id}/license",
    "/users/{id}/notification_rules",
    "/users/{id}/notification_rules/{notification_rule_id}",
    "/users/{id}/notification_subscriptions",
    "/users/{id}/notification_subscriptions/unsubscribe",
    "/users/{id}/oncall_handoff_notification_rules",
    "/users/{id}/oncall_handoff_notification_rules/{oncall_handoff_notification_rule_id}",
    "/users/{id}/sessions",
    "/users/{id}/sessions/{type}/{session_id}",
    "/users/{id}/status_update_notification_rules",
    "/users/{id}/status_update_notification_rules/{status_update_notification_rule_id}",
    "/users/me",
    "/vendors",
    "/vendors/{id}",
    "/webhook_subscriptions",
    "/webhook_subscriptions/{id}",
    "/webhook_subscriptions/{id}/enable",
    "/webhook_subscriptions/{id}/ping",
    "/workflows/integrations",
    "/workflows/integrations/{id}",
    "/workflows/integrations/connections",
    "/workflows/integrations/{integration_id}/connections",
    "/workflows/integrations/{integration_id}/connections/{id}",
];

pub(crate) const REST_V2_CURSOR_PATHS: &[&str] = &[
    "/audit/records",
    "/automation_actions/actions",
    "/automation_actions/runners",
    "/escalation_policies/{id}/audit/records",
    "/incident_workflows/actions",
    "/incident_workflows/triggers",
    "/schedules/{id}/audit/records",
    "/services/{id}/audit/records",
    "/teams/{id}/audit/records",
    "/users/{id}/audit/records",
    "/workflows/integrations",
    "/workflows/integrations/connections",
    "/workflows/integrations/{integration_id}/connections",
];

pub(crate) const REST_V2_WRAPPERS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("* /analytics/metrics/incidents/all", None, None),
    ("* /analytics/metrics/incidents/escalation_policies", None, None),
    ("* /analytics/metrics/incidents/escalation_policies/all", None, None),
    ("* /analytics/metrics/incidents/services", None, None),
    ("* /analytics/metrics/incidents/services/all", None, None),
    ("* /analytics/metrics/incidents/teams", None, None),
    ("* /analytics/metrics/incidents/teams/all", None, None),
    ("* /analytics/metrics/pd_advance_usage/features", None, None),
    ("* /analytics/metrics/responders/all", None, None),
    ("* /analytics/metrics/responders/teams", None, None),
    ("* /analytics/raw/incidents", None, None),
    ("* /analytics/raw/incidents/{id}", None, None),
    ("* /analytics/raw/incidents/{id}/responses", None, None),
    ("POST /automation_actions/actions/{id}/invocations", None, Some("invocation")),
    ("GET /paused_incident_reports/alerts", Some("paused_incident_reporting_counts"), Some("paused_incident_reporting_counts")),
    ("GET /paused_incident_reports/counts", Some("paused_incident_reporting_counts"), Some("paused_incident_reporting_counts")),
    ("* /business_services/{id}/account_subscription", None, None),
    ("POST /business_services/{id}/subscribers", Some("subscribers"), Some("subscriptions")),
    ("POST /business_services/{id}/unsubscribe", Some("subscribers"), None),
    ("* /business_services/priority_thresholds", None, None),
    ("GET /business_services/impacts", Some("services"), Some("services")),
    ("GET /business_services/{id}/supporting_services/impacts", Some("services"), Some("services")),
    ("POST /change_events", None, None),
    ("GET /incidents/{id}/related_change_events", Some("change_events"), Some("change_events")),
    ("* /event_orchestrations", Some("orchestrations"), Some("orchestrations")),
    ("* /event_orchestrations/services/{service_id}", Some("orchestration_path"), Some("orchestration_path")),
    ("* /event_orchestrations/services/{service_id}/active", None, None),
    ("* /event_orchestrations/{id}", Some("orchestration"), Some("orchestration")),
    ("* /event_orchestrations/{id}/global", Some("orchestration_path"), Some("orchestration_path")),
    ("* /event_orchestrations/{id}/integrations/migration", None, None),
    ("* /event_orchestrations/{id}/router", Some("orchestration_path"), Some("orchestration_path")),
    ("* /event_orchestrations/{id}/unrouted", Some("orchestration_path"), Some("orchestration_path")),
    ("POST /extensions/{id}/enable", None, Some("extension")),
    ("PUT /incidents/{id}/merge", Some("source_incidents"), Some("incident")),
    ("POST /incidents/{id}/responder_requests", None, None),
    ("POST /incidents/{id}/snooze", None, Some("incident")),
    ("POST /incidents/{id}/status_updates", None, Some("status_update")),
    ("POST /incidents/{id}/status_updates/subscribers", Some("subscribers"), Some("subscriptions")),
    ("POST /incidents/{id}/status_updates/unsubscribe", Some("subscribers"), None),
    ("GET /incidents/{id}/business_services/impacts", Some("services"), Some("services")),
    ("PUT /incidents/{id}/business_services/{business_service_id}/impacts", None, None),
    ("* /incidents/{id}/custom_fields/values", Some("custom_fields"), Some("custom_fields")),
    ("* /incidents/custom_fields", Some("field"), Some("fields")),
    ("* /incidents/custom_fields/{field_id}", Some("field"), Some("field")),
    ("POST /incident_workflows/{id}/instances", Some("incident_workflow_instance"), Some("incident_workflow_instance")),
    ("POST /incident_workflows/triggers/{id}/services", Some("service"), Some("trigger")),
    ("POST /response_plays/{response_play_id}/run", None, None),
    ("POST /schedules/{id}/overrides", Some("overrides"), None),
    ("POST /service_dependencies/associate", Some("relationships"), Some("relationships")),
    ("POST /webhook_subscriptions/{id}/enable", None, Some("webhook_subscription")),
    ("POST /webhook_subscriptions/{id}/ping", None, None),
    ("GET /status_dashboards/{id}/service_impacts", Some("services"), Some("services")),
    ("GET /status_dashboards/url_slugs/{url_slug}", Some("status_dashboard"), Some("status_dashboard")),
    ("GET /status_dashboards/url_slugs/{url_slug}/service_impacts", Some("services"), Some("services")),
    ("POST /{entity_type}/{id}/change_tags", None, None),
    ("PUT /teams/{id}/escalation_policies/{escalation_policy_id}", None, None),
    ("POST /teams/{id}/notification_subscriptions", Some("subscribables"), Some("subscriptions")),
    ("POST /teams/{id}/notification_subscriptions/unsubscribe", Some("subscribables"), None),
    ("PUT /teams/{id}/users/{user_id}", None, None),
    ("GET /teams/{id}/notification_subscriptions", Some("subscriptions"), Some("subscriptions")),
    ("POST /templates/{id}/render", None, None),
    ("* /users/{id}/notification_subscriptions", Some("subscribables"), Some("subscriptions")),
    ("POST /users/{id}/notification_subscriptions/unsubscribe", Some("subscribables"), None),
    ("GET /users/{id}/sessions", Some("user_sessions"), Some("user_sessions")),
    ("GET /users/{id}/sessions/{type}/{session_id}", Some("user_session"), Some("user_session")),
    ("GET /users/me", Some("user"), Some("user")),
    ("GET /oauth_delegations/revocation_requests/status", None, None),
];