use serde::{Deserialize, Serialize};

/// Customer record as the engine sees it: just enough to address outbound
/// reminders. The full customer administration lives outside this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Looks up a customer by id in a read snapshot.
pub fn find_customer<'a>(customers: &'a [Customer], id: &str) -> Option<&'a Customer> {
    customers.iter().find(|c| c.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_customer_by_id() {
        let customers = vec![Customer {
            id: "c1".into(),
            name: "Bakkerij Jansen".into(),
            email: "info@bakkerijjansen.nl".into(),
        }];
        assert_eq!(find_customer(&customers, "c1").unwrap().name, "Bakkerij Jansen");
        assert!(find_customer(&customers, "c2").is_none());
    }
}
