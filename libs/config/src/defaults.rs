//! Embedded default configuration.
//!
//! The defaults order storage and pod-related resources ahead of the
//! workloads that consume them. Every default rule is a soft hint
//! (`ignoreIfCyclical: true`): broad defaults must never deadlock a deploy.

/// Revision of the embedded defaults, bumped whenever the YAML changes.
pub const DEFAULT_CONFIG_VERSION: u32 = 1;

const DEFAULT_CONFIG_YAML: &str = r#"---
apiVersion: kapply.dev/v1alpha1
kind: Config

additionalChangeGroups:
- name: change-groups.kapply.dev/storage-class
  resourceMatchers:
  - apiVersionKindMatcher: {kind: StorageClass, apiVersion: storage.k8s.io/v1}
  - apiVersionKindMatcher: {kind: StorageClass, apiVersion: storage.k8s.io/v1beta1}

- name: change-groups.kapply.dev/storage
  resourceMatchers:
  - apiVersionKindMatcher: {kind: PersistentVolume, apiVersion: v1}
  - apiVersionKindMatcher: {kind: PersistentVolumeClaim, apiVersion: v1}

- name: change-groups.kapply.dev/pod-related
  resourceMatchers:
  - apiVersionKindMatcher: {kind: NetworkPolicy, apiVersion: extensions/v1beta1}
  - apiVersionKindMatcher: {kind: NetworkPolicy, apiVersion: networking.k8s.io/v1}
  - apiVersionKindMatcher: {kind: ResourceQuota, apiVersion: v1}
  - apiVersionKindMatcher: {kind: LimitRange, apiVersion: v1}
  - apiVersionKindMatcher: {kind: PodSecurityPolicy, apiVersion: extensions/v1beta1}
  - apiVersionKindMatcher: {kind: PodSecurityPolicy, apiVersion: policy/v1beta1}
  - apiVersionKindMatcher: {kind: PodDisruptionBudget, apiVersion: policy/v1beta1}
  - apiVersionKindMatcher: {kind: PodDisruptionBudget, apiVersion: policy/v1}
  - apiVersionKindMatcher: {kind: ServiceAccount, apiVersion: v1}
  - apiVersionKindMatcher: {kind: Secret, apiVersion: v1}
  - apiVersionKindMatcher: {kind: ConfigMap, apiVersion: v1}
  - apiVersionKindMatcher: {kind: Service, apiVersion: v1}

additionalChangeRules:
- rules:
  - "upsert after upserting change-groups.kapply.dev/storage-class"
  ignoreIfCyclical: true
  resourceMatchers:
  - apiVersionKindMatcher: {kind: PersistentVolume, apiVersion: v1}
  - apiVersionKindMatcher: {kind: PersistentVolumeClaim, apiVersion: v1}

- rules:
  - "upsert after upserting change-groups.kapply.dev/pod-related"
  - "upsert after upserting change-groups.kapply.dev/storage-class"
  - "upsert after upserting change-groups.kapply.dev/storage"
  ignoreIfCyclical: true
  resourceMatchers:
  - apiVersionKindMatcher: {kind: Pod, apiVersion: v1}
  - anyResourceMatcher:
      matchers:
      # Deployment
      - apiVersionKindMatcher: {apiVersion: apps/v1, kind: Deployment}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta2, kind: Deployment}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta1, kind: Deployment}
      - apiVersionKindMatcher: {apiVersion: extensions/v1beta1, kind: Deployment}
      # ReplicaSet
      - apiVersionKindMatcher: {apiVersion: apps/v1, kind: ReplicaSet}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta2, kind: ReplicaSet}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta1, kind: ReplicaSet}
      - apiVersionKindMatcher: {apiVersion: extensions/v1beta1, kind: ReplicaSet}
      # StatefulSet
      - apiVersionKindMatcher: {apiVersion: apps/v1, kind: StatefulSet}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta2, kind: StatefulSet}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta1, kind: StatefulSet}
      - apiVersionKindMatcher: {apiVersion: extensions/v1beta1, kind: StatefulSet}
      # DaemonSet
      - apiVersionKindMatcher: {apiVersion: apps/v1, kind: DaemonSet}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta2, kind: DaemonSet}
      - apiVersionKindMatcher: {apiVersion: apps/v1beta1, kind: DaemonSet}
      - apiVersionKindMatcher: {apiVersion: extensions/v1beta1, kind: DaemonSet}
      # Job
      - apiVersionKindMatcher: {apiVersion: batch/v1, kind: Job}
  - anyResourceMatcher:
      matchers:
      - apiVersionKindMatcher: {apiVersion: batch/v1, kind: CronJob}
      - apiVersionKindMatcher: {apiVersion: batch/v1beta1, kind: CronJob}
      - apiVersionKindMatcher: {apiVersion: batch/v2alpha1, kind: CronJob}
"#;

/// The embedded default configuration as YAML text.
pub fn default_config_yaml() -> &'static str {
    DEFAULT_CONFIG_YAML
}

#[cfg(test)]
mod tests {
    use kapply_resources::Resource;

    use super::*;
    use crate::ConfigDocument;

    #[test]
    fn test_default_config_parses() {
        let docs = ConfigDocument::from_yaml_str(default_config_yaml()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].additional_change_groups.len(), 3);
        assert_eq!(docs[0].additional_change_rules.len(), 2);
    }

    #[test]
    fn test_default_rules_are_soft() {
        let docs = ConfigDocument::from_yaml_str(default_config_yaml()).unwrap();
        assert!(docs[0]
            .additional_change_rules
            .iter()
            .all(|rule| rule.ignore_if_cyclical));
    }

    #[test]
    fn test_default_workload_rule_selects_pod_templates() {
        let docs = ConfigDocument::from_yaml_str(default_config_yaml()).unwrap();
        let workload_rule = &docs[0].additional_change_rules[1];

        let deployment = Resource::new("apps/v1", "Deployment", "default", "web");
        let cron = Resource::new("batch/v1", "CronJob", "default", "nightly");
        let service = Resource::new("v1", "Service", "default", "web");

        assert!(workload_rule.resource_matchers.matches(&deployment));
        assert!(workload_rule.resource_matchers.matches(&cron));
        assert!(!workload_rule.resource_matchers.matches(&service));
    }
}
