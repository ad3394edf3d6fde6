use super::formula::Formula;

pub fn to_dimacs(formula: &Formula) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "p cnf {} {}\n",
        formula.num_vars(),
        formula.num_clauses()
    ));
    for clause in formula.clauses() {
        for &lit in clause {
            out.push_str(&format!("{} ", lit.to_dimacs()));
        }
        out.push_str("0\n");
    }
    out
}
