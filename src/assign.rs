use rust_decimal::Decimal;

use crate::model::{Employee, WorkOrder};

/// Picks the least-loaded employee for a new work order using weighted
/// workload scoring.
pub struct WorkloadScorer;

impl WorkloadScorer {
    /// Workload score for one employee: ten points per active work order
    /// plus the summed estimated hours of those orders, with flat
    /// penalties for unavailability (+1000) and vacation (+2000).
    /// Lower is better.
    pub fn score(employee: &Employee, work_orders: &[WorkOrder]) -> Decimal {
        let active: Vec<&WorkOrder> = work_orders
            .iter()
            .filter(|order| order.is_active() && order.assigned_to.as_deref() == Some(&employee.id))
            .collect();

        let mut score = Decimal::from(active.len() * 10)
            + active
                .iter()
                .map(|order| order.estimated_hours)
                .sum::<Decimal>();

        if !employee.available {
            score += Decimal::from(1000);
        }
        if employee.on_vacation {
            score += Decimal::from(2000);
        }
        score
    }
}

/// Returns the id of the best-scoring employee, or `None` when the list is
/// empty. Ties go to the earlier entry in `employees`: the ordering of the
/// input list is the documented tie-break, not an accident of sorting.
pub fn pick_assignee<'a>(employees: &'a [Employee], work_orders: &[WorkOrder]) -> Option<&'a str> {
    let mut best: Option<(&'a Employee, Decimal)> = None;
    for employee in employees {
        let score = WorkloadScorer::score(employee, work_orders);
        match &best {
            Some((_, best_score)) if score >= *best_score => {}
            _ => best = Some((employee, score)),
        }
    }
    best.map(|(employee, _)| employee.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{WorkOrderStatus, WorkOrderTimestamps};
    use rust_decimal_macros::dec;

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.into(),
            name: id.into(),
            available: true,
            on_vacation: false,
        }
    }

    fn order_for(employee_id: &str, hours: Decimal, status: WorkOrderStatus) -> WorkOrder {
        WorkOrder {
            id: format!("wo-{employee_id}-{hours}"),
            customer_id: "c-1".into(),
            assigned_to: Some(employee_id.into()),
            status,
            required_inventory: vec![],
            estimated_hours: hours,
            estimated_cost: dec!(0),
            timestamps: WorkOrderTimestamps::default(),
            quote_id: None,
            invoice_id: None,
            notes: vec![],
        }
    }

    #[test]
    fn score_counts_active_orders_and_hours() {
        let emp = employee("e1");
        let orders = vec![
            order_for("e1", dec!(4), WorkOrderStatus::ToDo),
            order_for("e1", dec!(2.5), WorkOrderStatus::InProgress),
        ];
        // 2 orders * 10 + 6.5 hours
        assert_eq!(WorkloadScorer::score(&emp, &orders), dec!(26.5));
    }

    #[test]
    fn completed_orders_do_not_count() {
        let emp = employee("e1");
        let orders = vec![order_for("e1", dec!(8), WorkOrderStatus::Completed)];
        assert_eq!(WorkloadScorer::score(&emp, &orders), dec!(0));
    }

    #[test]
    fn other_employees_orders_do_not_count() {
        let emp = employee("e1");
        let orders = vec![order_for("e2", dec!(8), WorkOrderStatus::ToDo)];
        assert_eq!(WorkloadScorer::score(&emp, &orders), dec!(0));
    }

    #[test]
    fn unavailable_and_vacation_penalties_stack() {
        let mut emp = employee("e1");
        emp.available = false;
        emp.on_vacation = true;
        assert_eq!(WorkloadScorer::score(&emp, &[]), dec!(3000));
    }

    #[test]
    fn least_loaded_employee_wins() {
        let employees = vec![employee("e1"), employee("e2")];
        let orders = vec![
            order_for("e1", dec!(4), WorkOrderStatus::ToDo),
            order_for("e1", dec!(4), WorkOrderStatus::ToDo),
            order_for("e2", dec!(2), WorkOrderStatus::ToDo),
        ];
        assert_eq!(pick_assignee(&employees, &orders), Some("e2"));
    }

    #[test]
    fn vacation_beats_heavy_workload() {
        let mut e1 = employee("e1");
        e1.on_vacation = true;
        let employees = vec![e1, employee("e2")];
        let orders = vec![
            order_for("e2", dec!(40), WorkOrderStatus::ToDo),
            order_for("e2", dec!(40), WorkOrderStatus::ToDo),
        ];
        // e2 scores 100, e1 scores 2000: the busy colleague still wins.
        assert_eq!(pick_assignee(&employees, &orders), Some("e2"));
    }

    #[test]
    fn tie_goes_to_first_listed() {
        let employees = vec![employee("e1"), employee("e2"), employee("e3")];
        assert_eq!(pick_assignee(&employees, &[]), Some("e1"));
    }

    #[test]
    fn empty_employee_list_yields_none() {
        assert_eq!(pick_assignee(&[], &[]), None);
    }
}
