macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and its clients
pub mod v1 {
    pub mod auth {
        pub const LOGIN: &str = v1_path!("/auth/login");
        pub const REFRESH: &str = v1_path!("/auth/refresh");
        pub const LOGOUT: &str = v1_path!("/auth/logout");
    }

    pub mod users {
        pub const CURRENT: &str = v1_path!("/users/me");
    }

    pub mod buvettes {
        pub const COLLECTION: &str = v1_path!("/buvettes");
        pub const BY_SPORT: &str = v1_path!("/buvettes/by-sport/{sport}");
        pub const PRODUCTS: &str = v1_path!("/buvettes/{id}/products");
        pub const PRODUCT_ITEM: &str =
            v1_path!("/buvettes/{id}/products/{product_id}");
        pub const PRODUCTS_REORDER: &str =
            v1_path!("/buvettes/{id}/products/reorder");
    }

    pub mod products {
        pub const COLLECTION: &str = v1_path!("/products");
    }

    pub mod events {
        pub const COLLECTION: &str = v1_path!("/events");
        pub const ITEM: &str = v1_path!("/events/{id}");
        pub const BUVETTES: &str = v1_path!("/events/{id}/buvettes");
        pub const ASSIGNMENTS: &str = v1_path!("/events/{id}/assignments");
        pub const STAFF: &str = v1_path!("/events/{id}/buvettes/{buvette_id}/staff");
        pub const STAFF_ITEM: &str =
            v1_path!("/events/{id}/buvettes/{buvette_id}/staff/{staff_id}");

        pub mod timesheets {
            pub const COLLECTION: &str = v1_path!("/events/{id}/timesheets");
            pub const BY_BUVETTE: &str =
                v1_path!("/events/{id}/timesheets/by-buvette");
            pub const DRAFTS: &str = v1_path!("/events/{id}/timesheets/drafts");
            pub const SUMMARY: &str = v1_path!("/events/{id}/timesheets/summary");
            pub const DETAILED: &str =
                v1_path!("/events/{id}/timesheets/detailed");
        }

        pub mod inventory {
            pub const SHEET: &str =
                v1_path!("/events/{id}/buvettes/{buvette_id}/inventory");
            pub const SNAPSHOTS: &str =
                v1_path!("/events/{id}/buvettes/{buvette_id}/inventory/snapshots");
            pub const SHORTAGES: &str = v1_path!("/events/{id}/shortages");
            pub const RESTOCK: &str = v1_path!("/events/{id}/restock");
            pub const SUMMARY: &str = v1_path!("/events/{id}/inventory/summary");
        }

        pub mod checklists {
            pub const FILL: &str = v1_path!(
                "/events/{id}/buvettes/{buvette_id}/checklists/{template_id}"
            );
            pub const SUMMARY: &str = v1_path!("/events/{id}/checklists/summary");
        }

        pub const HOURS_EXPORT: &str = v1_path!("/events/{id}/hours/export");
    }

    pub mod staff {
        pub const ROSTER: &str = v1_path!("/staff");
        pub const MEMBERS: &str = v1_path!("/staff-members");
        pub const MEMBER_ITEM: &str = v1_path!("/staff-members/{id}");
    }

    pub mod timesheets {
        pub const ITEM: &str = v1_path!("/timesheets/{id}");
        pub const SUBMIT: &str = v1_path!("/timesheets/{id}/submit");
        pub const VALIDATE: &str = v1_path!("/timesheets/{id}/validate");
        pub const SHIFTS: &str = v1_path!("/timesheets/{id}/shifts");
    }

    pub mod checklists {
        pub const TEMPLATES: &str = v1_path!("/checklists/templates");
        pub const TEMPLATE_ITEM: &str = v1_path!("/checklists/templates/{id}");
        pub const RESPONSE_ITEM: &str = v1_path!("/checklists/responses/{id}");
        pub const RESPONSE_SUBMIT: &str =
            v1_path!("/checklists/responses/{id}/submit");
        pub const RESPONSE_VALIDATE: &str =
            v1_path!("/checklists/responses/{id}/validate");
    }
}

pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Replace multiple path parameters in order.
    pub fn replace_params(
        route: &str,
        params: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> String {
        let mut path = route.to_string();
        for (param, value) in params {
            path = path.replace(param.as_ref(), value.as_ref());
        }
        path
    }

    /// Append query parameters to the provided route.
    pub fn with_query(route: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return route.to_string();
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{route}?{query}")
    }
}
