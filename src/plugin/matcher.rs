// src/plugin/matcher.rs
//
// Pure selector predicates. Matching is deliberately permissive about
// information missing on the service side: a service without a name or
// without identified software satisfies any constraint on that attribute,
// so detectors still run against poorly-identified services.

use crate::core::{NetworkService, TargetInfo};

use super::Selectors;

/// True if the service satisfies every service-level selector predicate.
pub fn matches_service(selectors: &Selectors, service: &NetworkService) -> bool {
    has_matching_service_name(selectors, service)
        && has_matching_software(selectors, service)
        && has_matching_web_service(selectors, service)
}

/// True if the target's operating system satisfies the OS selector.
pub fn matches_os(selectors: &Selectors, target_info: &TargetInfo) -> bool {
    let Some(os_selector) = &selectors.os_class else {
        return true;
    };
    target_info.operating_system_classes.iter().any(|os| {
        let vendor_ok = os_selector.vendors.is_empty()
            || os_selector
                .vendors
                .iter()
                .any(|vendor| vendor.eq_ignore_ascii_case(&os.vendor));
        let family_ok = os_selector.families.is_empty()
            || os_selector
                .families
                .iter()
                .any(|family| family.eq_ignore_ascii_case(&os.os_family));
        vendor_ok && family_ok && os.accuracy >= os_selector.min_accuracy
    })
}

/// The services the plugin should receive, in input order. The full list is
/// returned when the selectors carry no service-level constraint; nothing is
/// returned when the OS predicate fails, regardless of the services.
pub fn filter_services(
    selectors: &Selectors,
    services: &[NetworkService],
    target_info: &TargetInfo,
) -> Vec<NetworkService> {
    if !matches_os(selectors, target_info) {
        return Vec::new();
    }
    if !selectors.has_service_constraint() {
        return services.to_vec();
    }
    services
        .iter()
        .filter(|service| matches_service(selectors, service))
        .cloned()
        .collect()
}

fn has_matching_service_name(selectors: &Selectors, service: &NetworkService) -> bool {
    if selectors.service_names.is_empty() {
        return true;
    }
    let Some(name) = service.service_name.as_deref() else {
        return true;
    };
    selectors
        .service_names
        .iter()
        .any(|wanted| wanted.eq_ignore_ascii_case(name))
}

fn has_matching_software(selectors: &Selectors, service: &NetworkService) -> bool {
    let Some(wanted) = selectors.software_name.as_deref() else {
        return true;
    };
    let Some(software) = &service.software else {
        return true;
    };
    wanted.trim().eq_ignore_ascii_case(software.name.trim())
}

fn has_matching_web_service(selectors: &Selectors, service: &NetworkService) -> bool {
    if !selectors.for_web_service {
        return true;
    }
    service.is_web_service()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        NetworkEndpoint, OperatingSystemClass, Software, TargetInfo, Transport,
    };
    use crate::plugin::OsClassSelector;

    fn service(port: u16, name: Option<&str>) -> NetworkService {
        let mut service = NetworkService::new(
            NetworkEndpoint::for_ip_and_port("1.1.1.1".parse().unwrap(), port),
            Transport::Tcp,
        );
        if let Some(name) = name {
            service = service.with_service_name(name);
        }
        service
    }

    fn fake_os_target(accuracy: u32) -> TargetInfo {
        TargetInfo::default().with_os_class(OperatingSystemClass {
            os_type: Some("general purpose".to_string()),
            vendor: "Vendor".to_string(),
            os_family: "FakeOS".to_string(),
            accuracy,
        })
    }

    #[test]
    fn empty_selectors_match_any_service() {
        assert!(matches_service(&Selectors::default(), &service(80, Some("http"))));
        assert!(matches_service(&Selectors::default(), &service(12345, None)));
    }

    #[test]
    fn service_name_selector_matches_named_and_unnamed_services() {
        let selectors = Selectors::for_service_names(["http"]);

        assert!(matches_service(&selectors, &service(80, Some("http"))));
        assert!(!matches_service(&selectors, &service(443, Some("https"))));
        // No service name on the scanned side is permissive.
        assert!(matches_service(&selectors, &service(12345, None)));
    }

    #[test]
    fn service_name_comparison_is_case_insensitive() {
        let selectors = Selectors::for_service_names(["HTTP"]);
        assert!(matches_service(&selectors, &service(80, Some("http"))));
    }

    #[test]
    fn software_selector_matches_software_and_missing_software() {
        let selectors = Selectors::for_software("Jenkins");
        let jenkins = service(443, Some("https")).with_software(Software::named("Jenkins"));
        let wordpress = service(80, Some("http")).with_software(Software::named("WordPress"));

        assert!(matches_service(&selectors, &jenkins));
        assert!(!matches_service(&selectors, &wordpress));
        assert!(matches_service(&selectors, &service(12345, None)));
    }

    #[test]
    fn software_comparison_trims_and_ignores_case() {
        let selectors = Selectors::for_software("  jenkins ");
        let jenkins = service(443, Some("https")).with_software(Software::named("Jenkins"));
        assert!(matches_service(&selectors, &jenkins));
    }

    #[test]
    fn web_service_selector_only_matches_web_names() {
        let selectors = Selectors::for_web_service();

        assert!(matches_service(&selectors, &service(80, Some("http"))));
        assert!(matches_service(&selectors, &service(8080, Some("http-proxy"))));
        assert!(matches_service(&selectors, &service(443, Some("ssl/https"))));
        assert!(!matches_service(&selectors, &service(22, Some("ssh"))));
        assert!(!matches_service(&selectors, &service(12345, None)));
    }

    #[test]
    fn os_selector_requires_matching_class() {
        let selectors = Selectors::default().with_os_class(OsClassSelector {
            families: vec!["FakeOS".to_string()],
            ..OsClassSelector::default()
        });

        assert!(matches_os(&selectors, &fake_os_target(99)));
        assert!(!matches_os(&selectors, &TargetInfo::default()));
    }

    #[test]
    fn os_selector_enforces_min_accuracy() {
        let selectors = Selectors::default().with_os_class(OsClassSelector {
            families: vec!["FakeOS".to_string()],
            min_accuracy: 90,
            ..OsClassSelector::default()
        });

        assert!(matches_os(&selectors, &fake_os_target(96)));
        assert!(!matches_os(&selectors, &fake_os_target(80)));
    }

    #[test]
    fn os_selector_vendor_and_family_are_conjunctive() {
        let selectors = Selectors::default().with_os_class(OsClassSelector {
            vendors: vec!["OtherVendor".to_string()],
            families: vec!["FakeOS".to_string()],
            ..OsClassSelector::default()
        });

        assert!(!matches_os(&selectors, &fake_os_target(99)));
    }

    #[test]
    fn no_os_selector_matches_any_target() {
        assert!(matches_os(&Selectors::default(), &TargetInfo::default()));
    }

    #[test]
    fn filter_services_preserves_input_order() {
        let services = vec![
            service(80, Some("http")),
            service(443, Some("https")),
            service(12345, None),
        ];
        let selectors = Selectors::for_service_names(["http"]);

        let filtered = filter_services(&selectors, &services, &TargetInfo::default());

        assert_eq!(filtered, vec![services[0].clone(), services[2].clone()]);
    }

    #[test]
    fn filter_services_returns_full_list_without_service_constraints() {
        let services = vec![service(80, Some("http")), service(22, Some("ssh"))];
        let os_only = Selectors::default().with_os_class(OsClassSelector {
            families: vec!["FakeOS".to_string()],
            ..OsClassSelector::default()
        });

        let filtered = filter_services(&os_only, &services, &fake_os_target(99));

        assert_eq!(filtered, services);
    }

    #[test]
    fn filter_services_is_empty_when_os_predicate_fails() {
        let services = vec![service(80, Some("http"))];
        let selectors = Selectors::for_service_names(["http"]).with_os_class(OsClassSelector {
            families: vec!["FakeOS".to_string()],
            ..OsClassSelector::default()
        });

        let filtered = filter_services(&selectors, &services, &TargetInfo::default());

        assert!(filtered.is_empty());
    }
}
