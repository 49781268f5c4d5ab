//! Contract interfaces
//!
//! `LoanRecord` mirrors the anonymous 10-field tuple returned by
//! `getLoansByUser`; struct and tuple share one ABI encoding.

use alloy_sol_types::sol;
use plume_common::Loan;

sol! {
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }

    struct LoanRecord {
        address borrower;
        uint256 loanId;
        address collateralToken;
        uint256 collateralAmount;
        uint256 amount;
        uint256 repayAmount;
        uint256 feeAmount;
        uint256 dueDate;
        bool repaid;
        bool overdue;
    }

    interface IPlumePawn {
        function LTV() external view returns (uint256);
        function getLoansByUser(address user) external view returns (LoanRecord[] memory);
        function requestLoan(
            address collateralToken,
            uint256 collateralAmount,
            uint256 loanAmount,
            uint256 duration
        ) external;
        function repayLoan(uint256 loanId) external;
    }
}

impl From<LoanRecord> for Loan {
    fn from(record: LoanRecord) -> Self {
        Loan {
            borrower: record.borrower,
            loan_id: record.loanId,
            collateral_token: record.collateralToken,
            collateral_amount: record.collateralAmount,
            amount: record.amount,
            repay_amount: record.repayAmount,
            fee_amount: record.feeAmount,
            due_date: record.dueDate,
            repaid: record.repaid,
            overdue: record.overdue,
        }
    }
}
